//! Types tracked by the job state store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Positive integer identifying the asset (app) to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(u32);

impl AppId {
    /// Returns `None` for zero; identifiers are strictly positive.
    pub fn new(raw: u32) -> Option<Self> {
        (raw > 0).then_some(AppId(raw))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error for identifiers that are not positive integers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid appid")]
pub struct InvalidAppId;

impl FromStr for AppId {
    type Err = InvalidAppId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(AppId::new)
            .ok_or(InvalidAppId)
    }
}

/// Acquisition phase. `Unknown` is only reported for ids that were never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Unknown,
    Queued,
    Checking,
    Downloading,
    Processing,
    Installing,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Unknown => "unknown",
            JobStatus::Queued => "queued",
            JobStatus::Checking => "checking",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Installing => "installing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

/// Snapshot of one acquisition. Field names follow what pollers expect on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub status: JobStatus,
    /// Bytes received during the current mirror attempt only.
    pub bytes_read: u64,
    /// 0 means the source did not report a length (indeterminate, not empty).
    pub total_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_mirror_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_entry: Option<String>,
}

impl JobRecord {
    /// Fresh record for a newly accepted request.
    pub fn queued() -> Self {
        JobRecord {
            status: JobStatus::Queued,
            ..JobRecord::default()
        }
    }
}

/// Partial update merged into a `JobRecord`; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub bytes_read: Option<u64>,
    pub total_bytes: Option<u64>,
    pub destination_path: Option<PathBuf>,
    pub installed_path: Option<PathBuf>,
    pub error_message: Option<String>,
    pub current_mirror_index: Option<usize>,
    pub archive_sha256: Option<String>,
    pub payload_entry: Option<String>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        JobUpdate {
            status: Some(status),
            ..JobUpdate::default()
        }
    }

    /// Start of a mirror attempt: counters go back to zero.
    pub fn checking(mirror_index: usize) -> Self {
        JobUpdate {
            status: Some(JobStatus::Checking),
            bytes_read: Some(0),
            total_bytes: Some(0),
            current_mirror_index: Some(mirror_index),
            ..JobUpdate::default()
        }
    }

    pub fn downloading(total_bytes: u64) -> Self {
        JobUpdate {
            status: Some(JobStatus::Downloading),
            bytes_read: Some(0),
            total_bytes: Some(total_bytes),
            ..JobUpdate::default()
        }
    }

    pub fn bytes_read(bytes_read: u64) -> Self {
        JobUpdate {
            bytes_read: Some(bytes_read),
            ..JobUpdate::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        JobUpdate {
            status: Some(JobStatus::Failed),
            error_message: Some(message.into()),
            ..JobUpdate::default()
        }
    }

    pub fn with_destination(mut self, path: PathBuf) -> Self {
        self.destination_path = Some(path);
        self
    }

    pub fn with_installed(mut self, path: PathBuf) -> Self {
        self.installed_path = Some(path);
        self
    }

    /// Merge present fields into `record`.
    pub fn apply(self, record: &mut JobRecord) {
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.bytes_read {
            record.bytes_read = v;
        }
        if let Some(v) = self.total_bytes {
            record.total_bytes = v;
        }
        if let Some(v) = self.destination_path {
            record.destination_path = Some(v);
        }
        if let Some(v) = self.installed_path {
            record.installed_path = Some(v);
        }
        if let Some(v) = self.error_message {
            record.error_message = Some(v);
        }
        if let Some(v) = self.current_mirror_index {
            record.current_mirror_index = Some(v);
        }
        if let Some(v) = self.archive_sha256 {
            record.archive_sha256 = Some(v);
        }
        if let Some(v) = self.payload_entry {
            record.payload_entry = Some(v);
        }
    }
}
