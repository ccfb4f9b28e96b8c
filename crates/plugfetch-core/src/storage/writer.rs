//! Sequential writer for staging files.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writer for one staging file. Bytes are appended in arrival order; the file
/// only takes its final name once `finalize` succeeds.
pub struct StagingWriter {
    file: File,
    temp_path: PathBuf,
    written: u64,
}

impl StagingWriter {
    pub(crate) fn from_file_and_path(file: File, temp_path: PathBuf) -> Self {
        Self {
            file,
            temp_path,
            written: 0,
        }
    }

    /// Append `data`; returns the total bytes written so far.
    pub fn append(&mut self, data: &[u8]) -> io::Result<u64> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(self.written)
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Trim preallocated space past the written bytes, sync, and rename the temp
    /// file to `final_path`. Consumes the writer and closes the file.
    pub fn finalize(self, final_path: &Path) -> io::Result<u64> {
        self.file.set_len(self.written)?;
        self.file.sync_all()?;
        let StagingWriter {
            file,
            temp_path,
            written,
        } = self;
        drop(file);
        std::fs::rename(&temp_path, final_path)?;
        Ok(written)
    }

    /// Close and delete the temp file (abandoned mirror attempt).
    pub fn discard(self) {
        let StagingWriter { file, temp_path, .. } = self;
        drop(file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), "failed to remove partial staging file: {}", e);
        }
    }
}
