//! Client for the S4 object-storage API.

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::chain::{RequestChain, RetryPolicy};
use crate::models::{SignedUrl, UploadResponse};
use crate::transport::{Part, Request, RequestError, TransportError};

use super::{Error, service_chain, validate};

/// Default base URL of the storage API.
pub const DEFAULT_STORAGE_URL: &str = "https://storage-api.salad.com";

/// Options for a file upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// MIME type of the file; inferred from the extension when `None`
    pub mime_type: Option<String>,
    /// Request a signed access URL in the response
    pub sign: bool,
    /// Expiry of the signature in seconds (must be at least 1 when set)
    pub signature_exp: Option<u64>,
}

impl UploadOptions {
    /// Options requesting a signed URL with the default expiry.
    #[must_use]
    pub fn signed() -> Self {
        Self {
            mime_type: None,
            sign: true,
            signature_exp: None,
        }
    }
}

/// Client for uploading files and minting signed URLs.
///
/// Uploads are streamed from disk; the file is never buffered whole in
/// memory. Configuration is immutable after construction and the client is
/// safe to share across concurrent calls.
#[derive(Debug)]
pub struct StorageService {
    chain: RequestChain,
    base_url: Url,
}

impl StorageService {
    /// Creates a storage client for the default API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] if the key is not a valid header
    /// value.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        Self::with_config(
            api_key,
            Url::parse(DEFAULT_STORAGE_URL).expect("default storage URL is valid"),
            crate::transport::DEFAULT_TIMEOUT,
            RetryPolicy::default(),
        )
    }

    /// Creates a storage client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] if the key is not a valid header
    /// value.
    pub fn with_config(
        api_key: &str,
        base_url: Url,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, Error> {
        Ok(Self {
            chain: service_chain(api_key, timeout, retry_policy)?,
            base_url,
        })
    }

    #[cfg(test)]
    pub(crate) const fn from_parts(chain: RequestChain, base_url: Url) -> Self {
        Self { chain, base_url }
    }

    /// Returns the configured base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn object_url(
        &self,
        collection: &str,
        organization_name: &str,
        filename: &str,
    ) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::Request(RequestError::Transport(TransportError::InvalidUrl(
                    self.base_url.to_string(),
                )))
            })?
            .extend(["organizations", organization_name, collection, filename]);
        Ok(url)
    }

    /// Uploads a local file and returns the URL where it can be accessed.
    ///
    /// The object name is the path's final component; the MIME type comes
    /// from `options` or is inferred from the extension. The file streams
    /// from disk on every attempt.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed organization name, empty
    /// filename, or zero signature expiry; otherwise propagates chain and
    /// decode failures.
    pub async fn upload_file(
        &self,
        organization_name: &str,
        local_file_path: &Path,
        options: &UploadOptions,
    ) -> Result<UploadResponse, Error> {
        validate::organization_name(organization_name)?;
        let filename = local_file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(validate::ValidationError::EmptyFilename)?;
        validate::filename(&filename)?;

        let mime = options.mime_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(local_file_path)
                .first_or_octet_stream()
                .essence_str()
                .to_owned()
        });

        let mut request = Request::put(self.object_url("files", organization_name, &filename)?)
            .with_part(Part::file("file", local_file_path).with_mime(mime.clone()))
            .with_part(Part::text("mimeType", mime))
            .with_part(Part::text("sign", options.sign.to_string()));

        if let Some(exp) = options.signature_exp {
            validate::minimum("signatureExp", exp, 1)?;
            request = request.with_part(Part::text("signatureExp", exp.to_string()));
        }

        tracing::debug!(organization_name, filename, "Uploading file to storage");
        let response = self.chain.send(&request).await?;
        response.json().map_err(Error::Decode)
    }

    /// Mints a signed URL for an already stored object.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed organization name, empty
    /// filename, or zero expiry; otherwise propagates chain and decode
    /// failures.
    pub async fn sign_url(
        &self,
        organization_name: &str,
        filename: &str,
        method: http::Method,
        exp: u64,
    ) -> Result<SignedUrl, Error> {
        validate::organization_name(organization_name)?;
        validate::filename(filename)?;
        validate::minimum("exp", exp, 1)?;

        let body = serde_json::json!({
            "method": method.as_str(),
            "exp": exp,
        });
        let request = Request::post(self.object_url("file_tokens", organization_name, filename)?)
            .with_json(body);

        let response = self.chain.send(&request).await?;
        response.json().map_err(Error::Decode)
    }
}
