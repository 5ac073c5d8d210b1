//! Blocking variants of the service clients.
//!
//! Same contract and error types as the async clients, implemented as thin
//! wrappers that own a dedicated single-thread runtime and block on the
//! async implementation, one method per async method. Intended for callers
//! without an async runtime; do not use these from inside one.

use std::path::Path;
use std::time::Duration;

use crate::models::{Job, JobList, SignedUrl, TranscriptionRequest, UploadResponse};
use crate::services::{
    Error, Source, TranscriptionClientBuilder, UploadOptions,
};
use crate::webhook::WebhookHeaders;

/// Blocking client for creating and tracking transcription jobs.
///
/// # Example
///
/// ```no_run
/// use salad_transcribe::blocking::TranscriptionClient;
/// use salad_transcribe::models::TranscriptionRequest;
///
/// # fn example() -> Result<(), salad_transcribe::Error> {
/// let client = TranscriptionClient::new("my-api-key")?;
/// let job = client.transcribe(
///     "https://example.com/interview.mp4",
///     "my-org",
///     &TranscriptionRequest::default(),
/// )?;
/// println!("created job {}", job.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TranscriptionClient {
    inner: crate::services::TranscriptionClient,
    runtime: tokio::runtime::Runtime,
}

impl TranscriptionClient {
    /// Creates a blocking client for the default API endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] for a malformed key or
    /// [`Error::Runtime`] if the runtime cannot start.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::from_builder(crate::services::TranscriptionClient::builder(api_key))
    }

    /// Creates a blocking client from a configured builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] for a malformed key or
    /// [`Error::Runtime`] if the runtime cannot start.
    pub fn from_builder(builder: TranscriptionClientBuilder) -> Result<Self, Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        Ok(Self {
            inner: builder.build()?,
            runtime,
        })
    }

    /// Creates a transcription job and returns it immediately.
    ///
    /// # Errors
    ///
    /// See [`TranscriptionClient::transcribe`](crate::TranscriptionClient::transcribe).
    pub fn transcribe(
        &self,
        source: impl Into<Source>,
        organization_name: &str,
        request: &TranscriptionRequest,
    ) -> Result<Job, Error> {
        self.runtime
            .block_on(self.inner.transcribe(source, organization_name, request))
    }

    /// Creates a transcription job and blocks until it reaches a terminal
    /// state.
    ///
    /// # Errors
    ///
    /// See [`TranscriptionClient::transcribe_and_wait`](crate::TranscriptionClient::transcribe_and_wait).
    pub fn transcribe_and_wait(
        &self,
        source: impl Into<Source>,
        organization_name: &str,
        request: &TranscriptionRequest,
    ) -> Result<Job, Error> {
        self.runtime.block_on(
            self.inner
                .transcribe_and_wait(source, organization_name, request),
        )
    }

    /// Fetches a transcription job by ID.
    ///
    /// # Errors
    ///
    /// See [`TranscriptionClient::get_job`](crate::TranscriptionClient::get_job).
    pub fn get_job(&self, organization_name: &str, job_id: &str) -> Result<Job, Error> {
        self.runtime
            .block_on(self.inner.get_job(organization_name, job_id))
    }

    /// Lists transcription jobs for an organization.
    ///
    /// # Errors
    ///
    /// See [`TranscriptionClient::list_jobs`](crate::TranscriptionClient::list_jobs).
    pub fn list_jobs(
        &self,
        organization_name: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<JobList, Error> {
        self.runtime
            .block_on(self.inner.list_jobs(organization_name, page, page_size))
    }

    /// Cancels a transcription job.
    ///
    /// # Errors
    ///
    /// See [`TranscriptionClient::delete_job`](crate::TranscriptionClient::delete_job).
    pub fn delete_job(&self, organization_name: &str, job_id: &str) -> Result<(), Error> {
        self.runtime
            .block_on(self.inner.delete_job(organization_name, job_id))
    }

    /// Blocks until a job reaches a terminal state.
    ///
    /// # Errors
    ///
    /// See [`TranscriptionClient::wait_for_completion`](crate::TranscriptionClient::wait_for_completion).
    pub fn wait_for_completion(
        &self,
        organization_name: &str,
        job_id: &str,
    ) -> Result<Job, Error> {
        self.runtime
            .block_on(self.inner.wait_for_completion(organization_name, job_id))
    }

    /// Uploads a local file through the storage API.
    ///
    /// # Errors
    ///
    /// See [`StorageService::upload_file`](crate::StorageService::upload_file).
    pub fn upload_file(
        &self,
        organization_name: &str,
        local_file_path: &Path,
        options: &UploadOptions,
    ) -> Result<UploadResponse, Error> {
        self.runtime.block_on(self.inner.storage().upload_file(
            organization_name,
            local_file_path,
            options,
        ))
    }

    /// Mints a signed URL for a stored object.
    ///
    /// # Errors
    ///
    /// See [`StorageService::sign_url`](crate::StorageService::sign_url).
    pub fn sign_url(
        &self,
        organization_name: &str,
        filename: &str,
        method: http::Method,
        exp: u64,
    ) -> Result<SignedUrl, Error> {
        self.runtime.block_on(
            self.inner
                .storage()
                .sign_url(organization_name, filename, method, exp),
        )
    }

    /// Verifies an inbound webhook delivery and returns the job it carries.
    ///
    /// Verification is pure computation; no runtime is involved.
    ///
    /// # Errors
    ///
    /// See [`TranscriptionClient::process_webhook`](crate::TranscriptionClient::process_webhook).
    pub fn process_webhook(
        &self,
        payload: &[u8],
        signing_secret: &str,
        headers: &WebhookHeaders,
    ) -> Result<Job, Error> {
        self.inner.process_webhook(payload, signing_secret, headers)
    }

    /// Returns the configured poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.inner.poll_interval()
    }
}
