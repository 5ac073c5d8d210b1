//! Job lifecycle and storage response types.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a transcription job.
///
/// Exactly three states are terminal: succeeded, failed, and cancelled.
/// Anything else, including states this client does not know about, keeps
/// polling loops running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Created,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// Any state this client version does not recognize.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Returns true if the job has reached a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// A transcription job as reported by the job-management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job identifier
    pub id: String,

    /// Current lifecycle state
    pub status: JobStatus,

    /// Organization that owns the job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,

    /// Inference endpoint the job runs on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_endpoint_name: Option<String>,

    /// Input the job was created with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,

    /// Transcript output, present once the job succeeds.
    ///
    /// Kept as raw JSON; the transcript schema is owned by the remote
    /// service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,

    /// Completion callback URL, if one was configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,

    /// Caller metadata echoed back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Creation time (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,

    /// Last update time (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// One page of jobs from the list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobList {
    /// Jobs on this page
    #[serde(default)]
    pub items: Vec<Job>,
}

/// Response of a storage upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// URL where the uploaded file can be accessed
    pub url: String,
}

/// Response of a sign-URL request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUrl {
    /// Time-limited access URL
    pub url: String,
}
