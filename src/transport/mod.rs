//! Request and response value types and the reqwest-backed transport.
//!
//! This module provides:
//! - Building requests ([`Request`], [`Part`])
//! - Response types ([`Response`], [`ResponseStream`])
//! - The terminal chain handler performing real HTTP ([`HttpTransport`])
//! - The request error taxonomy ([`TransportError`], [`RequestError`])

mod client;
mod error;
mod request;
mod response;


pub use client::{DEFAULT_TIMEOUT, HttpTransport};
pub use error::{RequestError, TransportError};
pub use request::{Body, Part, PartContent, Request};
pub use response::{ChunkStream, Response, ResponseStream};
