//! Installed-file layout and the atomic payload installer.
//!
//! Payloads land in `<root>/config/<plugin_subdir>/<id>.<ext>`. A sibling with
//! a `.disabled` suffix counts as installed but is never written here.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::LayoutConfig;
use crate::error::AcquireError;
use crate::jobs::AppId;

/// Suffix of a payload the user switched off.
pub const DISABLED_SUFFIX: &str = ".disabled";

/// Where payloads and the shared configuration document live.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
    plugin_subdir: String,
    payload_ext: String,
    shared_config_name: String,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>, layout: &LayoutConfig) -> Self {
        InstallLayout {
            root: root.into(),
            plugin_subdir: layout.plugin_subdir.clone(),
            payload_ext: layout.payload_ext.clone(),
            shared_config_name: layout.shared_config_name.clone(),
        }
    }

    pub fn payload_ext(&self) -> &str {
        &self.payload_ext
    }

    /// `<root>/config/<plugin_subdir>`
    pub fn plugin_dir(&self) -> PathBuf {
        self.root.join("config").join(&self.plugin_subdir)
    }

    /// `<plugin_dir>/<id>.<ext>`
    pub fn payload_path(&self, id: AppId) -> PathBuf {
        self.plugin_dir().join(format!("{}.{}", id, self.payload_ext))
    }

    /// `<plugin_dir>/<id>.<ext>.disabled`
    pub fn disabled_path(&self, id: AppId) -> PathBuf {
        self.plugin_dir()
            .join(format!("{}.{}{}", id, self.payload_ext, DISABLED_SUFFIX))
    }

    /// `<plugin_dir>/<shared_config_name>.<ext>`
    pub fn shared_config_path(&self) -> PathBuf {
        self.plugin_dir()
            .join(format!("{}.{}", self.shared_config_name, self.payload_ext))
    }

    /// True if the active or the disabled payload file exists.
    pub fn is_installed(&self, id: AppId) -> bool {
        self.payload_path(id).exists() || self.disabled_path(id).exists()
    }
}

/// Write `text` as the complete contents of `<id>.<ext>` and return its absolute path.
///
/// The text goes to a temp file in the plugin dir which is then renamed over
/// the target, so readers never observe a half-written payload.
pub fn install_payload(layout: &InstallLayout, id: AppId, text: &str) -> Result<PathBuf, AcquireError> {
    let dir = layout.plugin_dir();
    std::fs::create_dir_all(&dir).map_err(|e| AcquireError::install_io(&dir, e))?;

    let dest = layout.payload_path(id);
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{}.", id))
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(|e| AcquireError::install_io(&dir, e))?;
    tmp.write_all(text.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| AcquireError::install_io(tmp.path(), e))?;
    tmp.persist(&dest)
        .map_err(|e| AcquireError::install_io(&dest, e.error))?;

    let dest = std::path::absolute(&dest).map_err(|e| AcquireError::install_io(&dest, e))?;
    tracing::info!(appid = %id, "installed payload -> {}", dest.display());
    Ok(dest)
}
