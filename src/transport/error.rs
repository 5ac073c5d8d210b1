//! Error types for request execution.

use std::path::PathBuf;

use thiserror::Error;

/// Connection-level error for a single HTTP attempt.
///
/// Describes what went wrong without dictating recovery strategy; the retry
/// handler decides which of these are worth another attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    ///
    /// The server did not respond within the configured timeout period.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This typically indicates a configuration error rather than
    /// a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A multipart file part could not be opened for streaming.
    #[error("Failed to read upload source '{}': {source}", path.display())]
    FileRead {
        /// Path of the file that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A multipart part carried a content type that is not a valid MIME type.
    #[error("Invalid MIME type '{0}'")]
    InvalidMime(String),
}

/// Error produced by the request chain.
///
/// Separates connection-level failures (retryable) from HTTP-level failures
/// (retryable only for transient statuses). The original status code and body
/// are preserved verbatim so callers can inspect the real failure after
/// retries are exhausted.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The attempt failed before an HTTP response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {}", String::from_utf8_lossy(body))]
    Status {
        /// HTTP status code of the response
        status: http::StatusCode,
        /// Raw response body, unmodified
        body: Vec<u8>,
    },

    /// The chain was composed without a terminal transport handler.
    #[error("Request chain has no transport handler")]
    NoTransport,
}

impl RequestError {
    /// Returns the HTTP status code if the server produced one.
    #[must_use]
    pub const fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
