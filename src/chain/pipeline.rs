//! Handler interface and ordered chain composition.

use std::future::Future;
use std::pin::Pin;

use crate::transport::{Request, RequestError, Response, ResponseStream};

/// Boxed future returned by chain handlers.
pub type HandlerFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, RequestError>> + Send + 'a>>;

/// A single stage of the request chain.
///
/// Each handler receives the request and a [`Next`] continuation over the
/// handlers after it. A middleware handler (retry, logging) invokes the
/// continuation one or more times; a terminal handler (the transport)
/// ignores it and performs the actual I/O.
///
/// Handlers must not mutate the request: they either pass it through
/// unchanged or produce a response, which keeps replayed attempts
/// byte-identical.
pub trait Handler: Send + Sync {
    /// Processes the request, producing one buffered response.
    fn handle<'a>(&'a self, request: &'a Request, next: Next<'a>) -> HandlerFuture<'a, Response>;

    /// Processes the request, producing a lazily consumed response.
    fn stream<'a>(
        &'a self,
        request: &'a Request,
        next: Next<'a>,
    ) -> HandlerFuture<'a, ResponseStream>;
}

/// Continuation over the remaining handlers in the chain.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    handlers: &'a [Box<dyn Handler>],
}

impl<'a> Next<'a> {
    pub(crate) const fn new(handlers: &'a [Box<dyn Handler>]) -> Self {
        Self { handlers }
    }

    /// Invokes the next handler with the request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NoTransport`] if no handler remains, which
    /// means the chain was composed without a terminal transport.
    pub fn run(self, request: &'a Request) -> HandlerFuture<'a, Response> {
        match self.handlers.split_first() {
            Some((head, rest)) => head.handle(request, Self::new(rest)),
            None => Box::pin(async { Err(RequestError::NoTransport) }),
        }
    }

    /// Invokes the next handler in streaming mode.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NoTransport`] if no handler remains.
    pub fn run_stream(self, request: &'a Request) -> HandlerFuture<'a, ResponseStream> {
        match self.handlers.split_first() {
            Some((head, rest)) => head.stream(request, Self::new(rest)),
            None => Box::pin(async { Err(RequestError::NoTransport) }),
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.handlers.len())
            .finish()
    }
}

/// An ordered pipeline of handlers ending in a transport.
///
/// The first handler added is the outermost: it runs first on the way in and
/// last on the way out. The final handler must be a terminal transport such
/// as [`HttpTransport`]; sending through a chain whose continuation runs out
/// fails with [`RequestError::NoTransport`].
///
/// [`HttpTransport`]: crate::transport::HttpTransport
///
/// # Example
///
/// ```
/// use salad_transcribe::chain::{RequestChain, RetryHandler};
/// use salad_transcribe::transport::HttpTransport;
///
/// let chain = RequestChain::new()
///     .add_handler(RetryHandler::new())
///     .add_handler(HttpTransport::new());
/// assert_eq!(chain.len(), 2);
/// ```
pub struct RequestChain {
    handlers: Vec<Box<dyn Handler>>,
}

impl RequestChain {
    /// Creates an empty chain.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler to the pipeline.
    ///
    /// Order matters: the first added wraps all subsequent ones.
    #[must_use]
    pub fn add_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Number of handlers in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Sends the request through the chain, returning a buffered response.
    ///
    /// # Errors
    ///
    /// Propagates whatever error the innermost failing handler produced;
    /// nothing is swallowed or rewrapped.
    pub async fn send(&self, request: &Request) -> Result<Response, RequestError> {
        Next::new(&self.handlers).run(request).await
    }

    /// Sends the request through the chain in streaming mode.
    ///
    /// The returned stream is finite and not restartable; dropping it
    /// abandons the underlying connection.
    ///
    /// # Errors
    ///
    /// Propagates the innermost failing handler's error.
    pub async fn stream(&self, request: &Request) -> Result<ResponseStream, RequestError> {
        Next::new(&self.handlers).run_stream(request).await
    }
}

impl Default for RequestChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RequestChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestChain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
