//! Destination for one mirror attempt's body: staging file plus progress accounting.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::http::FetchError;
use crate::jobs::{AppId, JobStore, JobUpdate};
use crate::storage::{self, StagingWriter, StagingWriterBuilder};

/// Receives the body of a confirmed (HTTP 200) response chunk by chunk.
///
/// The staging file is only created once `begin` is called, so error bodies
/// from skipped mirrors never touch disk. Every persisted chunk publishes the
/// new `bytesRead` to the job store.
pub struct DownloadSink {
    store: Arc<JobStore>,
    id: AppId,
    final_path: PathBuf,
    expected_len: Option<u64>,
    writer: Option<StagingWriter>,
}

impl DownloadSink {
    pub fn new(store: Arc<JobStore>, id: AppId, final_path: &Path) -> Self {
        DownloadSink {
            store,
            id,
            final_path: final_path.to_path_buf(),
            expected_len: None,
            writer: None,
        }
    }

    pub fn has_begun(&self) -> bool {
        self.writer.is_some()
    }

    /// Response confirmed: create the staging file and move the job to `downloading`.
    /// `content_length` of `None` is reported as `totalBytes = 0` (indeterminate).
    pub fn begin(&mut self, content_length: Option<u64>) -> Result<(), FetchError> {
        let mut builder = StagingWriterBuilder::create(&storage::temp_path(&self.final_path))?;
        if let Some(n) = content_length.filter(|n| *n > 0) {
            builder.preallocate(n)?;
        }
        self.writer = Some(builder.build());
        self.expected_len = content_length;
        self.store
            .set(self.id, JobUpdate::downloading(content_length.unwrap_or(0)));
        Ok(())
    }

    /// Persist one chunk and publish the running byte count.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), FetchError> {
        if data.is_empty() {
            return Ok(());
        }
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| FetchError::staging("chunk before begin"))?;
        let total = writer.append(data)?;
        self.store.set(self.id, JobUpdate::bytes_read(total));
        Ok(())
    }

    /// Verify the length and move the staging file into place. Returns bytes written.
    pub fn finish(mut self) -> Result<u64, FetchError> {
        let writer = match self.writer.take() {
            Some(w) => w,
            None => return Err(FetchError::staging("no body received")),
        };
        if let Some(expected) = self.expected_len {
            if writer.written() != expected {
                let received = writer.written();
                writer.discard();
                return Err(FetchError::ShortBody { expected, received });
            }
        }
        Ok(writer.finalize(&self.final_path)?)
    }

    /// Drop any partial staging file from an abandoned attempt.
    pub fn abandon(mut self) {
        if let Some(w) = self.writer.take() {
            w.discard();
        }
    }
}
