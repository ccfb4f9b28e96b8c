//! `plugfetch checksum <path>` – SHA-256 of a file.

use anyhow::{bail, Context, Result};
use plugfetch_core::checksum;
use std::path::Path;

pub fn run_checksum(path: &Path, expect: Option<&str>) -> Result<()> {
    let digest =
        checksum::sha256_path(path).with_context(|| format!("read {}", path.display()))?;
    println!("{}  {}", digest, path.display());
    if let Some(expected) = expect {
        if !checksum::digest_matches(&digest, expected) {
            bail!("checksum mismatch: expected {}, got {}", expected.trim(), digest);
        }
    }
    Ok(())
}
