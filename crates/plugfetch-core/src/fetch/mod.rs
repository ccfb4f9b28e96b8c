//! Mirror fallback downloader.
//!
//! Tries each mirror in order with a streaming GET. Any failure on one mirror
//! (404, other status, transport error, short body, staging write) is logged at
//! debug and the next mirror is tried. Only exhausting the list is an error.

mod sink;
mod stream;

pub use sink::DownloadSink;
pub use stream::stream_to_sink;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::AcquireError;
use crate::http::{classify, HttpClient};
use crate::jobs::{AppId, JobStore, JobUpdate};
use crate::mirrors::MirrorCandidate;

/// A fully downloaded archive sitting at its staging path.
#[derive(Debug, Clone)]
pub struct StagedArchive {
    pub path: PathBuf,
    /// Index of the mirror that served it.
    pub mirror_index: usize,
    pub bytes: u64,
}

/// Download the archive for `id` from the first mirror that serves it completely.
///
/// Sets `checking` (with zeroed counters) before each attempt; the sink moves the
/// job to `downloading` once a 200 is confirmed. Blocking: run on `spawn_blocking`.
pub fn fetch_from_mirrors(
    client: &HttpClient,
    store: &Arc<JobStore>,
    id: AppId,
    mirrors: &[MirrorCandidate],
    staging_path: PathBuf,
) -> Result<StagedArchive, AcquireError> {
    for mirror in mirrors {
        store.set(id, JobUpdate::checking(mirror.index));
        let mut sink = DownloadSink::new(Arc::clone(store), id, &staging_path);

        let attempt = stream_to_sink(client, mirror.url.as_str(), &mut sink);
        let result = match attempt {
            Ok(()) => sink.finish(),
            Err(e) => {
                sink.abandon();
                Err(e)
            }
        };

        match result {
            Ok(bytes) => {
                tracing::info!(
                    appid = %id,
                    mirror = mirror.index,
                    bytes,
                    "download complete -> {}",
                    staging_path.display()
                );
                return Ok(StagedArchive {
                    path: staging_path,
                    mirror_index: mirror.index,
                    bytes,
                });
            }
            Err(e) => {
                tracing::debug!(
                    appid = %id,
                    mirror = mirror.index,
                    url = %mirror.url,
                    reason = ?classify(&e),
                    "mirror skipped: {}",
                    e
                );
            }
        }
    }

    Err(AcquireError::AllSourcesExhausted)
}
