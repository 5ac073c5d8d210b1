//! Response value types returned by the request chain.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio_stream::Stream;

use super::TransportError;

/// An HTTP response received from a server.
///
/// Produced by the transport handler for 2xx statuses and owned solely by
/// the caller once the chain returns it. The body is fully buffered.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response headers (case-insensitive lookup via [`http::HeaderMap`])
    pub headers: http::HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the `Content-Type` header value, if present and valid UTF-8.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the body as a UTF-8 string, if valid.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying decode error if the body is not valid JSON
    /// for `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Boxed stream of body chunks produced by a streaming transport.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// A lazily consumed HTTP response.
///
/// Status and headers are available immediately; the body arrives as a
/// finite sequence of chunks. Dropping the stream abandons the underlying
/// connection; it cannot be restarted.
pub struct ResponseStream {
    status: http::StatusCode,
    headers: http::HeaderMap,
    chunks: ChunkStream,
}

impl ResponseStream {
    /// Creates a streaming response from its parts.
    #[must_use]
    pub fn new(status: http::StatusCode, headers: http::HeaderMap, chunks: ChunkStream) -> Self {
        Self {
            status,
            headers,
            chunks,
        }
    }

    /// HTTP status code of the response.
    #[must_use]
    pub const fn status(&self) -> http::StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }
}

impl Stream for ResponseStream {
    type Item = Result<Bytes, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.chunks.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
