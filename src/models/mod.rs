//! Data transfer types for the transcription and storage APIs.
//!
//! These are plain wire shapes with no invariants beyond type shape. The
//! transcript output itself is intentionally left as raw JSON rather than
//! modelled field by field.

mod job;
mod request;


pub use job::{Job, JobList, JobStatus, SignedUrl, UploadResponse};
pub use request::{
    TranscriptionEngine, TranscriptionInput, TranscriptionRequest, TranslationLanguage,
};
