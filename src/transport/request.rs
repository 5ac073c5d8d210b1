//! Outgoing request value type and multipart parts.

use std::path::{Path, PathBuf};

/// An HTTP request to be sent through the request chain.
///
/// This is a value type built with a fluent API and consumed by the chain.
/// Handlers never mutate it in place; it is `Clone` so the retry handler can
/// replay the identical request on every attempt.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: http::Method,
    /// Target URL, with any path substitution already applied
    pub url: url::Url,
    /// HTTP headers to send in addition to the transport's defaults
    pub headers: http::HeaderMap,
    /// Request body
    pub body: Body,
}

impl Request {
    /// Creates a new request with the given method and URL.
    ///
    /// Headers start empty and the body is [`Body::Empty`].
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: Body::Empty,
        }
    }

    /// Creates a GET request to the given URL.
    #[must_use]
    pub fn get(url: url::Url) -> Self {
        Self::new(http::Method::GET, url)
    }

    /// Creates a POST request to the given URL.
    #[must_use]
    pub fn post(url: url::Url) -> Self {
        Self::new(http::Method::POST, url)
    }

    /// Creates a PUT request to the given URL.
    #[must_use]
    pub fn put(url: url::Url) -> Self {
        Self::new(http::Method::PUT, url)
    }

    /// Creates a DELETE request to the given URL.
    #[must_use]
    pub fn delete(url: url::Url) -> Self {
        Self::new(http::Method::DELETE, url)
    }

    /// Adds a header to the request.
    ///
    /// If the header name already exists, the value is appended
    /// (HTTP headers can have multiple values).
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets a JSON body.
    ///
    /// The transport serializes the value and sets
    /// `Content-Type: application/json`.
    #[must_use]
    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    /// Appends a multipart form part.
    ///
    /// Replaces any previously set JSON body; parts keep their insertion
    /// order on the wire.
    #[must_use]
    pub fn with_part(mut self, part: Part) -> Self {
        match &mut self.body {
            Body::Multipart(parts) => parts.push(part),
            _ => self.body = Body::Multipart(vec![part]),
        }
        self
    }
}

/// Request body variants understood by the transport.
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// JSON-encoded body.
    Json(serde_json::Value),
    /// Multipart form body.
    Multipart(Vec<Part>),
}

/// A named multipart form field.
#[derive(Debug, Clone)]
pub struct Part {
    /// Form field name
    pub name: String,
    /// Field content
    pub content: PartContent,
}

/// Content of a multipart form field.
#[derive(Debug, Clone)]
pub enum PartContent {
    /// Plain text field.
    Text(String),
    /// In-memory binary content with filename and MIME type.
    Bytes {
        /// Raw content
        data: Vec<u8>,
        /// Filename reported to the server
        filename: String,
        /// MIME type of the content
        mime: String,
    },
    /// File streamed from disk at send time.
    ///
    /// The file is re-opened on every attempt, so retries never depend on a
    /// partially consumed stream, and large files are never buffered whole.
    File {
        /// Path to stream from
        path: PathBuf,
        /// Filename reported to the server
        filename: String,
        /// MIME type of the content
        mime: String,
    },
}

impl Part {
    /// Creates a plain text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Text(value.into()),
        }
    }

    /// Creates an in-memory binary field.
    pub fn bytes(
        name: impl Into<String>,
        data: Vec<u8>,
        filename: impl Into<String>,
        mime: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Bytes {
                data,
                filename: filename.into(),
                mime: mime.into(),
            },
        }
    }

    /// Creates a field streamed from a file on disk.
    ///
    /// The filename defaults to the path's final component and the MIME type
    /// is inferred from the extension; use [`Part::with_mime`] to override.
    pub fn file(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let filename = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let mime = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();

        Self {
            name: name.into(),
            content: PartContent::File {
                path,
                filename,
                mime,
            },
        }
    }

    /// Overrides the MIME type of a binary or file field.
    ///
    /// Has no effect on text fields.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        match &mut self.content {
            PartContent::Bytes { mime: m, .. } | PartContent::File { mime: m, .. } => {
                *m = mime.into();
            }
            PartContent::Text(_) => {}
        }
        self
    }
}
