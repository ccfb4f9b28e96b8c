//! Errors that end an acquisition job.
//!
//! Per-mirror failures (`http::FetchError`) never reach this level; they only
//! cause the fallback loop to move on.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    /// Every mirror failed.
    #[error("Not available on any source")]
    AllSourcesExhausted,

    /// Staged file could not be opened or read as a zip archive.
    #[error("archive is malformed: {reason}")]
    MalformedArchive { reason: String },

    /// Archive has no entry named `<digits>.<ext>`.
    #[error("No numeric .{ext} file found in zip")]
    NoMatchingPayload { ext: String },

    /// Target directory or file could not be written.
    #[error("failed to install {}: {source}", path.display())]
    InstallIoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Background task died before reaching a terminal state.
    #[error("acquisition task failed: {0}")]
    Task(String),
}

impl AcquireError {
    pub(crate) fn malformed(reason: impl std::fmt::Display) -> Self {
        AcquireError::MalformedArchive {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn install_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AcquireError::InstallIoFailure {
            path: path.into(),
            source,
        }
    }
}
