//! Client for the transcription job API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::chain::{RequestChain, RetryPolicy};
use crate::models::{Job, JobList, TranscriptionRequest};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::Request;
use crate::webhook::{Webhook, WebhookHeaders};

use super::{Error, StorageService, UploadOptions, service_chain, validate};

/// Default base URL of the job-management API.
pub const DEFAULT_API_URL: &str = "https://api.salad.com/api/public";

/// Name of the authentication header (canonically spelled `Salad-Api-Key`).
pub const API_KEY_HEADER: &str = "salad-api-key";

/// Inference endpoint that runs transcription jobs.
const ENDPOINT_NAME: &str = "transcribe";

/// Default interval between completion polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Media to transcribe: a remote URL or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Remote media passed to the job as-is.
    Url(Url),
    /// Local file uploaded to storage before job creation.
    File(PathBuf),
}

impl Source {
    /// Classifies a caller-supplied source string.
    ///
    /// Anything that parses as an absolute `http`/`https` URL with a host
    /// is remote; everything else is treated as a local path.
    #[must_use]
    pub fn detect(source: &str) -> Self {
        if let Ok(url) = Url::parse(source) {
            if matches!(url.scheme(), "http" | "https") && url.has_host() {
                return Self::Url(url);
            }
        }
        Self::File(PathBuf::from(source))
    }
}

impl From<&str> for Source {
    fn from(source: &str) -> Self {
        Self::detect(source)
    }
}

impl From<Url> for Source {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

/// Wire body of the job-create request.
///
/// `webhook`/`webhook_url` are serialized only when the caller configured a
/// non-empty webhook.
#[derive(Serialize)]
struct JobPrototype<'a> {
    input: InputWithUrl<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a serde_json::Value>,
}

/// The caller's input with the resolved media URL injected.
#[derive(Serialize)]
struct InputWithUrl<'a> {
    #[serde(flatten)]
    input: &'a crate::models::TranscriptionInput,
    url: &'a str,
}

/// Builder for [`TranscriptionClient`].
///
/// All settings are optional except the API key; the built client is
/// immutable and safe to share across concurrent calls.
#[derive(Debug, Clone)]
pub struct TranscriptionClientBuilder {
    api_key: String,
    base_url: Url,
    storage_base_url: Url,
    timeout: Duration,
    retry_policy: RetryPolicy,
    poll_interval: Duration,
}

impl TranscriptionClientBuilder {
    fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            storage_base_url: Url::parse(super::DEFAULT_STORAGE_URL)
                .expect("default storage URL is valid"),
            timeout: crate::transport::DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the job-management API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Overrides the storage API base URL.
    #[must_use]
    pub fn storage_base_url(mut self, base_url: Url) -> Self {
        self.storage_base_url = base_url;
        self
    }

    /// Sets the per-attempt request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy for both the job and storage chains.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the interval between completion polls.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] if the key is not a valid header
    /// value.
    pub fn build(self) -> Result<TranscriptionClient, Error> {
        let chain = service_chain(&self.api_key, self.timeout, self.retry_policy.clone())?;
        let storage = StorageService::with_config(
            &self.api_key,
            self.storage_base_url,
            self.timeout,
            self.retry_policy,
        )?;

        Ok(TranscriptionClient {
            chain,
            storage,
            base_url: self.base_url,
            poll_interval: self.poll_interval,
            sleeper: TokioSleeper,
        })
    }
}

/// Asynchronous client for creating and tracking transcription jobs.
///
/// All state is read-only after construction; concurrent calls share no
/// mutable state. Polling and retry delays suspend the task instead of
/// blocking, and dropping an in-flight future cancels further polling.
///
/// # Example
///
/// ```no_run
/// use salad_transcribe::TranscriptionClient;
/// use salad_transcribe::models::{TranscriptionInput, TranscriptionRequest};
///
/// # async fn example() -> Result<(), salad_transcribe::Error> {
/// let client = TranscriptionClient::new("my-api-key")?;
/// let request = TranscriptionRequest::new(TranscriptionInput {
///     language_code: Some("en".into()),
///     diarization: Some(true),
///     ..TranscriptionInput::default()
/// });
///
/// let job = client
///     .transcribe("https://example.com/interview.mp4", "my-org", &request)
///     .await?;
/// println!("created job {}", job.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TranscriptionClient<S = TokioSleeper> {
    chain: RequestChain,
    storage: StorageService,
    base_url: Url,
    poll_interval: Duration,
    sleeper: S,
}

impl TranscriptionClient {
    /// Creates a client for the default API endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] if the key is not a valid header
    /// value.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::builder(api_key).build()
    }

    /// Starts building a client with custom configuration.
    pub fn builder(api_key: impl Into<String>) -> TranscriptionClientBuilder {
        TranscriptionClientBuilder::new(api_key.into())
    }
}

impl<S> TranscriptionClient<S> {
    #[cfg(test)]
    pub(crate) const fn from_parts(
        chain: RequestChain,
        storage: StorageService,
        base_url: Url,
        poll_interval: Duration,
        sleeper: S,
    ) -> Self {
        Self {
            chain,
            storage,
            base_url,
            poll_interval,
            sleeper,
        }
    }

    /// Returns the storage client sharing this client's credentials.
    #[must_use]
    pub const fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// Returns the configured poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn jobs_url(&self, organization_name: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::Request(crate::transport::RequestError::Transport(
                    crate::transport::TransportError::InvalidUrl(self.base_url.to_string()),
                ))
            })?
            .extend([
                "organizations",
                organization_name,
                "inference-endpoints",
                ENDPOINT_NAME,
                "jobs",
            ]);
        Ok(url)
    }

    fn job_url(&self, organization_name: &str, job_id: &str) -> Result<Url, Error> {
        let mut url = self.jobs_url(organization_name)?;
        url.path_segments_mut()
            .expect("jobs URL always has a path")
            .push(job_id);
        Ok(url)
    }
}

impl<S: Sleeper> TranscriptionClient<S> {
    /// Resolves a source into a URL the remote workers can fetch.
    ///
    /// Remote URLs pass through untouched; local files are uploaded to
    /// storage with a signed access URL.
    async fn resolve_source(
        &self,
        source: &Source,
        organization_name: &str,
    ) -> Result<String, Error> {
        match source {
            Source::Url(url) => Ok(url.to_string()),
            Source::File(path) => {
                let uploaded = self
                    .storage
                    .upload_file(organization_name, path, &UploadOptions::signed())
                    .await?;
                Ok(uploaded.url)
            }
        }
    }

    /// Creates a transcription job and returns it immediately.
    ///
    /// A local-file source is uploaded first; the job input carries the
    /// resulting URL in its `url` field. Use
    /// [`transcribe_and_wait`](Self::transcribe_and_wait) to also poll for
    /// completion.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call for a malformed
    /// organization name; otherwise propagates upload, chain, and decode
    /// failures.
    pub async fn transcribe(
        &self,
        source: impl Into<Source>,
        organization_name: &str,
        request: &TranscriptionRequest,
    ) -> Result<Job, Error> {
        validate::organization_name(organization_name)?;

        let source = source.into();
        let file_url = self.resolve_source(&source, organization_name).await?;

        let webhook = request
            .webhook
            .as_deref()
            .filter(|webhook| !webhook.is_empty());
        let prototype = JobPrototype {
            input: InputWithUrl {
                input: &request.input,
                url: &file_url,
            },
            webhook,
            webhook_url: webhook,
            metadata: request.metadata.as_ref(),
        };
        let body = serde_json::to_value(&prototype).map_err(Error::Encode)?;

        tracing::debug!(organization_name, url = %file_url, "Creating transcription job");
        let response = self
            .chain
            .send(&Request::post(self.jobs_url(organization_name)?).with_json(body))
            .await?;
        response.json().map_err(Error::Decode)
    }

    /// Creates a transcription job and polls until it reaches a terminal
    /// state.
    ///
    /// # Errors
    ///
    /// Same as [`transcribe`](Self::transcribe) plus any failure while
    /// polling.
    pub async fn transcribe_and_wait(
        &self,
        source: impl Into<Source>,
        organization_name: &str,
        request: &TranscriptionRequest,
    ) -> Result<Job, Error> {
        let job = self.transcribe(source, organization_name, request).await?;
        self.wait_for_completion(organization_name, &job.id).await
    }

    /// Fetches a transcription job by ID.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed organization name;
    /// otherwise propagates chain and decode failures.
    pub async fn get_job(&self, organization_name: &str, job_id: &str) -> Result<Job, Error> {
        validate::organization_name(organization_name)?;

        let response = self
            .chain
            .send(&Request::get(self.job_url(organization_name, job_id)?))
            .await?;
        response.json().map_err(Error::Decode)
    }

    /// Lists transcription jobs for an organization.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed organization name;
    /// otherwise propagates chain and decode failures.
    pub async fn list_jobs(
        &self,
        organization_name: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<JobList, Error> {
        validate::organization_name(organization_name)?;

        let mut url = self.jobs_url(organization_name)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(page) = page {
                query.append_pair("page", &page.to_string());
            }
            if let Some(page_size) = page_size {
                query.append_pair("page_size", &page_size.to_string());
            }
        }

        let response = self.chain.send(&Request::get(url)).await?;
        response.json().map_err(Error::Decode)
    }

    /// Cancels a transcription job.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed organization name;
    /// otherwise propagates chain failures.
    pub async fn delete_job(&self, organization_name: &str, job_id: &str) -> Result<(), Error> {
        validate::organization_name(organization_name)?;

        self.chain
            .send(&Request::delete(self.job_url(organization_name, job_id)?))
            .await?;
        Ok(())
    }

    /// Polls a job until it reaches a terminal state.
    ///
    /// Suspends for the configured poll interval between requests; exactly
    /// the states succeeded, failed, and cancelled stop the loop. Dropping
    /// the future cancels polling; no background work continues.
    ///
    /// # Errors
    ///
    /// Propagates the first failure from fetching the job.
    pub async fn wait_for_completion(
        &self,
        organization_name: &str,
        job_id: &str,
    ) -> Result<Job, Error> {
        loop {
            let job = self.get_job(organization_name, job_id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }
            tracing::debug!(job_id, status = ?job.status, "Job not finished, polling again");
            self.sleeper.sleep(self.poll_interval).await;
        }
    }

    /// Verifies an inbound webhook delivery and returns the job it carries.
    ///
    /// `payload` must be the exact bytes received on the wire.
    ///
    /// # Errors
    ///
    /// Returns the opaque [`crate::webhook::WebhookVerificationError`]
    /// (wrapped in [`Error::Webhook`]) on any verification failure.
    pub fn process_webhook(
        &self,
        payload: &[u8],
        signing_secret: &str,
        headers: &WebhookHeaders,
    ) -> Result<Job, Error> {
        let webhook = Webhook::new(signing_secret)?;
        Ok(webhook.verify_and_parse(payload, headers)?)
    }
}
