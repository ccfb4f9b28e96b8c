//! Staging file lifecycle.
//!
//! Archives are streamed into `<staging_dir>/<id>.zip.part` (preallocated with
//! fallocate on Linux when the length is known) and renamed to `<id>.zip` once
//! the body is complete.

mod builder;
mod writer;

pub use builder::StagingWriterBuilder;
pub use writer::StagingWriter;

use std::path::{Path, PathBuf};

use crate::jobs::AppId;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Final staging path for an app's archive.
pub fn staging_path(staging_dir: &Path, id: AppId) -> PathBuf {
    staging_dir.join(format!("{}.zip", id))
}

/// Path for the temp file: appends `.part` to the final path (e.g. `70.zip` → `70.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}
