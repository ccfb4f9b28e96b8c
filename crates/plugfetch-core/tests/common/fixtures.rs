//! Archive and config fixtures shared by integration tests.

use std::io::{Cursor, Write};
use std::path::Path;

use plugfetch_core::config::PlugfetchConfig;
use zip::write::SimpleFileOptions;

/// Build a zip in memory from `(entry name, contents)` pairs, in order.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Config rooted in `root` with the given mirror templates and metadata endpoint.
pub fn config(root: &Path, mirrors: Vec<String>, metadata_url: String) -> PlugfetchConfig {
    let mut cfg = PlugfetchConfig {
        install_root: Some(root.join("steam")),
        staging_dir: Some(root.join("staging")),
        mirrors,
        metadata_url,
        ..PlugfetchConfig::default()
    };
    cfg.http.connect_timeout_secs = 2;
    cfg.http.idle_timeout_secs = 2;
    cfg.http.low_speed_limit_bytes = 1;
    cfg.http.max_transfer_secs = 20;
    cfg
}
