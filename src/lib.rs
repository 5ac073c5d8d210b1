//! Client for the Salad Cloud transcription job API and S4 object storage.
//!
//! Submits audio/video files (local paths or remote URLs) for transcription,
//! polls or awaits completion, manages jobs, and verifies inbound webhook
//! deliveries. Requests run through a composable handler chain
//! (retry with exponential backoff wrapping an HTTP transport); webhook
//! signatures are checked in constant time against a tolerance window.

pub mod blocking;
pub mod chain;
pub mod models;
pub mod services;
pub mod time;
pub mod transport;
pub mod webhook;

pub use services::{Error, Source, StorageService, TranscriptionClient, TranscriptionClientBuilder};
