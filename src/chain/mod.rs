//! Composable request-dispatch pipeline.
//!
//! This module provides:
//! - The handler interface ([`Handler`], [`Next`])
//! - Ordered handler composition ([`RequestChain`])
//! - Retry with exponential backoff ([`RetryHandler`], [`RetryPolicy`])

mod pipeline;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::{Handler, HandlerFuture, Next, RequestChain};
pub use retry::{IsRetryable, RetryHandler, RetryPolicy};
