//! Config augmenter: appends missing `addappid(<sub>, 1)` lines to the shared
//! configuration document, using sub-ids from a remote metadata API.
//!
//! Presence is a plain substring check against the whole document, not
//! per-line equality, so a commented-out copy of a line also counts as present.

use std::io;
use std::path::PathBuf;

use crate::http::{FetchError, HttpClient};
use crate::install::InstallLayout;
use crate::jobs::AppId;

#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    /// Metadata call failed or did not recognise the id.
    #[error("Failed to fetch app details: {0}")]
    RemoteMetadataFailure(String),

    #[error("Failed to read {}: {source}", path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source of sub-identifiers (e.g. DLC ids) for an app.
pub trait MetadataSource {
    fn sub_ids(&self, id: AppId) -> Result<Vec<u64>, AugmentError>;
}

/// Store `appdetails` endpoint: `{"<id>": {"success": true, "data": {"dlc": [..]}}}`.
#[derive(Debug, Clone)]
pub struct StoreMetadata {
    client: HttpClient,
    url_template: String,
}

impl StoreMetadata {
    /// `url_template` contains `{id}`.
    pub fn new(client: HttpClient, url_template: impl Into<String>) -> Self {
        StoreMetadata {
            client,
            url_template: url_template.into(),
        }
    }
}

impl MetadataSource for StoreMetadata {
    fn sub_ids(&self, id: AppId) -> Result<Vec<u64>, AugmentError> {
        let url = self
            .url_template
            .replace(crate::mirrors::ID_PLACEHOLDER, &id.to_string());
        let body = self
            .client
            .get_text(&url)
            .map_err(|e: FetchError| AugmentError::RemoteMetadataFailure(e.to_string()))?;
        parse_sub_ids(&body, id)
    }
}

/// Extract the integer `dlc` list for `id` from an `appdetails` document.
/// Non-integer entries are ignored; a missing list is empty.
pub fn parse_sub_ids(body: &str, id: AppId) -> Result<Vec<u64>, AugmentError> {
    let doc: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AugmentError::RemoteMetadataFailure(e.to_string()))?;
    let app = doc
        .get(id.to_string())
        .filter(|app| app.get("success").and_then(|s| s.as_bool()) == Some(true))
        .ok_or_else(|| AugmentError::RemoteMetadataFailure("App not found or API error".to_string()))?;
    let ids = app
        .get("data")
        .and_then(|d| d.get("dlc"))
        .and_then(|d| d.as_array())
        .map(|list| list.iter().filter_map(|v| v.as_u64()).collect())
        .unwrap_or_default();
    Ok(ids)
}

/// Directive line registering one sub-id.
pub fn directive_line(sub_id: u64) -> String {
    format!("addappid({}, 1)", sub_id)
}

/// Append a directive line (plus `\n`) for every sub-id not already present in
/// `document`. Returns how many lines were added.
pub fn append_missing(document: &mut String, sub_ids: &[u64]) -> usize {
    let mut added = 0;
    for sub in sub_ids {
        let line = directive_line(*sub);
        if document.contains(&line) {
            continue;
        }
        document.push_str(&line);
        document.push('\n');
        added += 1;
        tracing::debug!(sub_id = sub, "added directive line");
    }
    added
}

/// Result of one augment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentOutcome {
    /// Sub-ids reported by the metadata source.
    pub found: usize,
    /// Lines appended (and written) this call.
    pub added: usize,
}

impl AugmentOutcome {
    pub fn message(&self) -> String {
        if self.found == 0 {
            "No DLCs found for this app".to_string()
        } else {
            format!("Added {} DLCs", self.added)
        }
    }
}

/// Reads, extends and (only when something changed) rewrites the shared document.
pub struct ConfigAugmenter<M> {
    layout: InstallLayout,
    source: M,
}

impl<M: MetadataSource> ConfigAugmenter<M> {
    pub fn new(layout: InstallLayout, source: M) -> Self {
        ConfigAugmenter { layout, source }
    }

    /// Blocking: run on `spawn_blocking` from async code.
    pub fn augment(&self, id: AppId) -> Result<AugmentOutcome, AugmentError> {
        let sub_ids = self.source.sub_ids(id)?;
        if sub_ids.is_empty() {
            return Ok(AugmentOutcome { found: 0, added: 0 });
        }

        let path = self.layout.shared_config_path();
        let mut document = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(AugmentError::ReadDocument { path, source }),
        };

        let added = append_missing(&mut document, &sub_ids);
        if added > 0 {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| AugmentError::WriteDocument {
                    path: path.clone(),
                    source,
                })?;
            }
            std::fs::write(&path, &document)
                .map_err(|source| AugmentError::WriteDocument { path: path.clone(), source })?;
            tracing::info!(appid = %id, added, "augmented {}", path.display());
        }

        Ok(AugmentOutcome {
            found: sub_ids.len(),
            added,
        })
    }
}
