//! Progress reporting derived from job snapshots (bytes done, ETA, rate).
//!
//! Used by the CLI poll loop; consumers can compute
//! rate = bytes_done / elapsed_secs and ETA = (total_bytes - bytes_done) / rate.

use super::types::JobRecord;

/// Snapshot of download progress for one job (CLI-friendly).
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Bytes received in the current mirror attempt.
    pub bytes_done: u64,
    /// Declared size in bytes; 0 when the source sent no length.
    pub total_bytes: u64,
    /// Seconds since the download phase was first observed.
    pub elapsed_secs: f64,
}

impl ProgressStats {
    pub fn from_record(record: &JobRecord, elapsed_secs: f64) -> Self {
        ProgressStats {
            bytes_done: record.bytes_read,
            total_bytes: record.total_bytes,
            elapsed_secs,
        }
    }

    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining. None when the size is unknown or no rate yet.
    pub fn eta_secs(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0], or None when the total is indeterminate.
    pub fn fraction(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        Some((self.bytes_done as f64 / self.total_bytes as f64).min(1.0))
    }
}
