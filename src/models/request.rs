//! Transcription job request types.

use serde::{Deserialize, Serialize};

/// Which remote engine runs the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionEngine {
    /// Full-featured engine supporting every option.
    Complete,
    /// Lightweight engine with fewer features, aimed at being faster.
    Lite,
}

/// Target languages for LLM and SRT translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationLanguage {
    English,
    French,
    German,
    Italian,
    Portuguese,
    Hindi,
    Spanish,
    Thai,
}

/// Configuration settings for a transcription job.
///
/// Serialized as the `input` object of the job-create request; the service
/// injects the resolved source `url` alongside these fields. All fields are
/// optional and omitted from the wire when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptionInput {
    /// Language spoken in the source media (e.g. `"en"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    /// Engine selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<TranscriptionEngine>,

    /// Translation directive (e.g. `"to_eng"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate: Option<String>,

    /// Emit per-sentence timestamps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence_level_timestamps: Option<bool>,

    /// Emit per-word timestamps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_level_timestamps: Option<bool>,

    /// Speaker diarization at word level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diarization: Option<bool>,

    /// Speaker diarization at sentence level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence_diarization: Option<bool>,

    /// Produce SRT captions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srt: Option<bool>,

    /// Summary length in words, 0 to disable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarize: Option<u32>,

    /// Comma-separated custom vocabulary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_vocabulary: Option<String>,

    /// Languages for LLM-based transcript translation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_translation: Option<Vec<TranslationLanguage>>,

    /// Languages for SRT caption translation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srt_translation: Option<Vec<TranslationLanguage>>,

    /// Deliver the transcript as a downloadable file instead of inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_as_file: Option<bool>,
}

/// A request to create a transcription job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptionRequest {
    /// Job configuration
    pub input: TranscriptionInput,

    /// URL to receive the completion callback.
    ///
    /// Included in the job-create request only when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,

    /// Caller metadata echoed back on the job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TranscriptionRequest {
    /// Creates a request with the given input and no webhook or metadata.
    #[must_use]
    pub fn new(input: TranscriptionInput) -> Self {
        Self {
            input,
            webhook: None,
            metadata: None,
        }
    }

    /// Sets the completion webhook URL.
    #[must_use]
    pub fn with_webhook(mut self, webhook: impl Into<String>) -> Self {
        self.webhook = Some(webhook.into());
        self
    }

    /// Attaches caller metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
