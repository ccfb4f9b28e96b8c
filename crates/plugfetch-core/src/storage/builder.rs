//! Builder for creating and preallocating staging files.

use std::fs::File;
use std::io;
use std::path::Path;

use super::writer::StagingWriter;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Builder for a new staging file. Call `preallocate` (when the length is known)
/// then `build` to get a sequential `StagingWriter`.
pub struct StagingWriterBuilder {
    file: File,
    temp_path: std::path::PathBuf,
}

impl StagingWriterBuilder {
    /// Create a new temp file at `temp_path` (e.g. `70.zip.part`), creating the
    /// parent directory. Truncates a leftover file from an earlier attempt.
    pub fn create(temp_path: &Path) -> io::Result<Self> {
        if let Some(parent) = temp_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(StagingWriterBuilder {
            file,
            temp_path: temp_path.to_path_buf(),
        })
    }

    /// Preallocate `size` bytes. On Unix tries `posix_fallocate`; falls back to
    /// `set_len` on failure or non-Unix. The write cursor stays at offset 0.
    pub fn preallocate(&mut self, size: u64) -> io::Result<()> {
        #[cfg(unix)]
        {
            let fd = self.file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        self.file.set_len(size)
    }

    pub fn build(self) -> StagingWriter {
        StagingWriter::from_file_and_path(self.file, self.temp_path)
    }
}
