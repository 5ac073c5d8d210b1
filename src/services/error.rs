//! Service-level error type.

use thiserror::Error;

use crate::transport::RequestError;
use crate::webhook::WebhookVerificationError;

use super::validate::ValidationError;

/// Error returned by the transcription and storage services.
///
/// Everything surfaces to the direct caller; retries inside the request
/// chain are the only local recovery. The original status code and body of
/// an HTTP failure stay available through [`RequestError`].
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, raised before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request chain failed (transport error or non-2xx status).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A 2xx response body did not match the expected shape.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The API key is not a valid HTTP header value.
    #[error("Invalid API key: not a valid header value")]
    InvalidApiKey,

    /// An inbound webhook failed verification.
    #[error(transparent)]
    Webhook(#[from] WebhookVerificationError),

    /// The blocking runtime could not be started.
    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl Error {
    /// Returns the HTTP status code if the failure carries one.
    #[must_use]
    pub const fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Request(e) => e.status(),
            _ => None,
        }
    }
}
