//! High-level clients for the transcription and object-storage APIs.
//!
//! This module provides:
//! - Input validation raised before any network call ([`validate`])
//! - The S4 object-storage client ([`StorageService`])
//! - The transcription job client ([`TranscriptionClient`])
//! - The service-level error type ([`Error`])

mod error;
mod storage;
mod transcription;
pub mod validate;

#[cfg(test)]
mod transcription_tests;

pub use error::Error;
pub use storage::{DEFAULT_STORAGE_URL, StorageService, UploadOptions};
pub use transcription::{
    API_KEY_HEADER, DEFAULT_API_URL, Source, TranscriptionClient, TranscriptionClientBuilder,
};

use std::time::Duration;

use crate::chain::{RequestChain, RetryHandler, RetryPolicy};
use crate::transport::HttpTransport;

/// Builds the standard `Retry → Transport` chain for a service.
///
/// The API key and accept header become transport defaults; per-request
/// headers still win on collision.
pub(crate) fn service_chain(
    api_key: &str,
    timeout: Duration,
    retry_policy: RetryPolicy,
) -> Result<RequestChain, Error> {
    let api_key_value =
        http::HeaderValue::from_str(api_key).map_err(|_| Error::InvalidApiKey)?;

    let transport = HttpTransport::new()
        .with_timeout(timeout)
        .with_default_header(
            http::HeaderName::from_static(API_KEY_HEADER),
            api_key_value,
        )
        .with_default_header(
            http::header::ACCEPT,
            http::HeaderValue::from_static("application/json"),
        );

    Ok(RequestChain::new()
        .add_handler(RetryHandler::with_policy(retry_policy))
        .add_handler(transport))
}
