//! Terminal transport handler backed by reqwest.

use std::time::Duration;

use tokio_stream::StreamExt;
use tokio_util::io::ReaderStream;

use crate::chain::{Handler, HandlerFuture, Next};

use super::{Body, Part, PartContent, Request, RequestError, Response, ResponseStream};
use super::TransportError;

/// Default wall-clock timeout for a single attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport handler that performs one HTTP attempt per invocation.
///
/// Sits at the end of the request chain: it serializes the request body,
/// merges the configured default headers under the per-request headers
/// (per-request wins on collision), applies the timeout, and normalizes the
/// outcome into a [`Response`] for 2xx statuses or a [`RequestError`]
/// otherwise.
///
/// # Example
///
/// ```no_run
/// use salad_transcribe::chain::RequestChain;
/// use salad_transcribe::transport::{HttpTransport, Request};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let chain = RequestChain::new().add_handler(HttpTransport::new());
/// let request = Request::get(Url::parse("https://api.salad.com/healthz")?);
/// let response = chain.send(&request).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    timeout: Duration,
    default_headers: http::HeaderMap,
}

impl HttpTransport {
    /// Creates a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Creates a transport from an existing reqwest client.
    ///
    /// Useful when you need custom configuration (connection pools, TLS,
    /// proxies).
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            inner: client,
            timeout: DEFAULT_TIMEOUT,
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a default header applied to every request.
    ///
    /// A header with the same name on an individual request takes
    /// precedence.
    #[must_use]
    pub fn with_default_header(
        mut self,
        name: http::HeaderName,
        value: http::HeaderValue,
    ) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Returns the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the configured default headers.
    #[must_use]
    pub const fn default_headers(&self) -> &http::HeaderMap {
        &self.default_headers
    }

    /// Merges default headers with per-request headers.
    ///
    /// Per-request values replace defaults of the same name.
    pub(crate) fn merged_headers(&self, request: &Request) -> http::HeaderMap {
        let mut headers = self.default_headers.clone();
        for name in request.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in &request.headers {
            headers.append(name, value.clone());
        }
        headers
    }

    /// Executes one attempt and returns the raw reqwest response.
    async fn execute(&self, request: &Request) -> Result<reqwest::Response, RequestError> {
        let mut builder = self
            .inner
            .request(request.method.clone(), request.url.as_str())
            .timeout(self.timeout)
            .headers(self.merged_headers(request));

        match &request.body {
            Body::Empty => {}
            Body::Json(value) => builder = builder.json(value),
            Body::Multipart(parts) => builder = builder.multipart(build_form(parts).await?),
        }

        let response = builder.send().await.map_err(map_send_error)?;
        Ok(response)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for HttpTransport {
    fn handle<'a>(&'a self, request: &'a Request, _next: Next<'a>) -> HandlerFuture<'a, Response> {
        Box::pin(async move {
            let response = self.execute(request).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Connection(Box::new(e)))?;

            if status.is_success() {
                Ok(Response::new(status, headers, body))
            } else {
                Err(RequestError::Status {
                    status,
                    body: body.to_vec(),
                })
            }
        })
    }

    fn stream<'a>(
        &'a self,
        request: &'a Request,
        _next: Next<'a>,
    ) -> HandlerFuture<'a, ResponseStream> {
        Box::pin(async move {
            let response = self.execute(request).await?;
            let status = response.status();
            let headers = response.headers().clone();

            if !status.is_success() {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| TransportError::Connection(Box::new(e)))?;
                return Err(RequestError::Status {
                    status,
                    body: body.to_vec(),
                });
            }

            let chunks = response
                .bytes_stream()
                .map(|item| item.map_err(|e| TransportError::Connection(Box::new(e))));
            Ok(ResponseStream::new(status, headers, Box::pin(chunks)))
        })
    }
}

/// Maps a reqwest send error onto the transport taxonomy.
fn map_send_error(error: reqwest::Error) -> RequestError {
    let transport = if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_builder() {
        TransportError::InvalidUrl(error.to_string())
    } else {
        TransportError::Connection(Box::new(error))
    };
    transport.into()
}

/// Builds a multipart form, opening file parts for streaming.
async fn build_form(parts: &[Part]) -> Result<reqwest::multipart::Form, TransportError> {
    let mut form = reqwest::multipart::Form::new();

    for part in parts {
        let encoded = match &part.content {
            PartContent::Text(value) => reqwest::multipart::Part::text(value.clone()),
            PartContent::Bytes {
                data,
                filename,
                mime,
            } => reqwest::multipart::Part::bytes(data.clone())
                .file_name(filename.clone())
                .mime_str(mime)
                .map_err(|_| TransportError::InvalidMime(mime.clone()))?,
            PartContent::File {
                path,
                filename,
                mime,
            } => {
                let file =
                    tokio::fs::File::open(path)
                        .await
                        .map_err(|e| TransportError::FileRead {
                            path: path.clone(),
                            source: e,
                        })?;
                let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
                reqwest::multipart::Part::stream(body)
                    .file_name(filename.clone())
                    .mime_str(mime)
                    .map_err(|_| TransportError::InvalidMime(mime.clone()))?
            }
        };
        form = form.part(part.name.clone(), encoded);
    }

    Ok(form)
}
