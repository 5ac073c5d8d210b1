//! Scripted transport handler shared by chain and service tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;

use crate::transport::{Request, RequestError, Response, ResponseStream};

use super::{Handler, HandlerFuture, Next};

/// Terminal handler that replays a scripted sequence of outcomes.
///
/// Records every request it sees and counts invocations, so tests can
/// assert exact retry counts and inspect the requests services build.
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<Response, ScriptedError>>>,
    requests: Mutex<Vec<Request>>,
    calls: AtomicUsize,
}

/// Cloneable stand-ins for [`RequestError`] values in scripts.
#[derive(Debug, Clone)]
pub(crate) enum ScriptedError {
    Timeout,
    Status(http::StatusCode, &'static str),
}

impl From<ScriptedError> for RequestError {
    fn from(scripted: ScriptedError) -> Self {
        match scripted {
            ScriptedError::Timeout => Self::Transport(crate::transport::TransportError::Timeout),
            ScriptedError::Status(status, body) => Self::Status {
                status,
                body: body.as_bytes().to_vec(),
            },
        }
    }
}

impl MockTransport {
    pub(crate) fn new(responses: Vec<Result<Response, ScriptedError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn always(response: Response) -> Self {
        Self::new(vec![Ok(response)])
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn captured_requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn next_outcome(&self, request: &Request) -> Result<Response, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let mut responses = self.responses.lock().unwrap();
        match responses.pop_front() {
            Some(outcome) => {
                // A single remaining entry is replayed indefinitely.
                if responses.is_empty() {
                    responses.push_back(outcome.clone());
                }
                outcome.map_err(Into::into)
            }
            None => panic!("MockTransport script is empty"),
        }
    }
}

impl Handler for std::sync::Arc<MockTransport> {
    fn handle<'a>(&'a self, request: &'a Request, _next: Next<'a>) -> HandlerFuture<'a, Response> {
        let outcome = self.next_outcome(request);
        Box::pin(async move { outcome })
    }

    fn stream<'a>(
        &'a self,
        request: &'a Request,
        _next: Next<'a>,
    ) -> HandlerFuture<'a, ResponseStream> {
        let outcome = self.next_outcome(request);
        Box::pin(async move {
            let response = outcome?;
            // Split the scripted body into two chunks to exercise consumers.
            let mid = response.body.len() / 2;
            let chunks: Vec<Result<Bytes, _>> = vec![
                Ok(response.body.slice(..mid)),
                Ok(response.body.slice(mid..)),
            ];
            Ok(ResponseStream::new(
                response.status,
                response.headers,
                Box::pin(tokio_stream::iter(chunks)),
            ))
        })
    }
}

/// Builds a 200 response with a JSON body.
pub(crate) fn json_response(value: &serde_json::Value) -> Response {
    let mut headers = http::HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    Response::new(
        http::StatusCode::OK,
        headers,
        Bytes::from(serde_json::to_vec(value).unwrap()),
    )
}

/// Builds an empty 2xx response.
pub(crate) fn empty_response(status: http::StatusCode) -> Response {
    Response::new(status, http::HeaderMap::new(), Bytes::new())
}
