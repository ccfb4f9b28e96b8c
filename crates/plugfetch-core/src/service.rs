//! Boundary operations for callers (CLI, bridge).
//!
//! Every operation takes the raw identifier text and returns a serialisable
//! reply; errors become `{success: false, error}` and never escape.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;

use crate::augment::{ConfigAugmenter, StoreMetadata};
use crate::catalog::{CatalogClient, Lookup};
use crate::config::PlugfetchConfig;
use crate::http::HttpClient;
use crate::install::InstallLayout;
use crate::jobs::{AppId, JobRecord, JobStore};
use crate::mirrors::{MirrorError, MirrorList};
use crate::patch::DirectivePatch;
use crate::pipeline::Acquirer;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Neither `install_root` nor `PLUGFETCH_INSTALL_ROOT` is set.
    #[error("Steam path not found")]
    InstallRootNotFound,

    #[error(transparent)]
    Mirrors(#[from] MirrorError),

    #[error("cannot resolve staging dir: {0:#}")]
    StagingDir(anyhow::Error),

    #[error("no tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Reply shape shared by every boundary operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<JobRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Reply {
    pub fn ok() -> Self {
        Reply {
            success: true,
            ..Reply::default()
        }
    }

    pub fn err(error: impl ToString) -> Self {
        Reply {
            success: false,
            error: Some(error.to_string()),
            ..Reply::default()
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn parse_id(raw: &str) -> Result<AppId, Reply> {
    raw.parse::<AppId>().map_err(Reply::err)
}

/// Open handle on the acquisition pipeline, augmenter and catalog lookups.
pub struct Service {
    handle: Handle,
    acquirer: Arc<Acquirer>,
    augmenter: Arc<ConfigAugmenter<StoreMetadata>>,
    catalog: CatalogClient,
}

impl Service {
    /// Must be called from inside a tokio runtime; acquisition tasks are spawned on it.
    pub fn open(cfg: &PlugfetchConfig) -> Result<Self, ServiceError> {
        let handle = Handle::try_current()?;
        let root = cfg
            .resolve_install_root()
            .ok_or(ServiceError::InstallRootNotFound)?;
        let staging_dir = cfg.resolve_staging_dir().map_err(ServiceError::StagingDir)?;
        let mirrors = MirrorList::from_templates(&cfg.mirrors)?;
        if mirrors.is_empty() {
            tracing::warn!("no mirrors configured; every acquisition will fail");
        }

        let client = HttpClient::new(&cfg.http);
        let layout = InstallLayout::new(&root, &cfg.layout);
        let patch = DirectivePatch::new(&cfg.layout.directive, &cfg.layout.comment_marker);
        let acquirer = Acquirer::new(
            client.clone(),
            Arc::new(JobStore::new()),
            mirrors,
            layout.clone(),
            staging_dir.clone(),
            patch,
        );
        let augmenter =
            ConfigAugmenter::new(layout, StoreMetadata::new(client.clone(), &cfg.metadata_url));
        let catalog = CatalogClient::new(client, &cfg.catalog_api_url);

        tracing::info!(
            install_root = %root.display(),
            staging = %staging_dir.display(),
            mirrors = cfg.mirrors.len(),
            "service opened"
        );
        Ok(Service {
            handle,
            acquirer: Arc::new(acquirer),
            augmenter: Arc::new(augmenter),
            catalog,
        })
    }

    /// Drop the handle and return how many acquisitions were still running.
    /// Those tasks are not cancelled; they finish on the runtime.
    pub fn close(self) -> usize {
        let store = self.acquirer.store();
        let running = store
            .ids()
            .into_iter()
            .filter(|id| store.is_in_flight(*id))
            .count();
        tracing::info!(running, "service closed");
        running
    }

    pub fn install_layout(&self) -> &InstallLayout {
        self.acquirer.layout()
    }

    /// Queue an acquisition and return at once.
    pub fn start_acquisition(&self, raw_id: &str) -> Reply {
        let id = match parse_id(raw_id) {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        match self.acquirer.start(&self.handle, id) {
            Ok(()) => Reply::ok(),
            Err(e) => {
                tracing::debug!(appid = %id, "start rejected: {}", e);
                Reply::err(e)
            }
        }
    }

    /// Current record; the default `unknown` record for never-started ids.
    pub fn acquisition_status(&self, raw_id: &str) -> Reply {
        match parse_id(raw_id) {
            Ok(id) => Reply {
                state: Some(self.acquirer.store().get(id)),
                ..Reply::ok()
            },
            Err(reply) => reply,
        }
    }

    pub fn has_installed_asset(&self, raw_id: &str) -> Reply {
        match parse_id(raw_id) {
            Ok(id) => Reply {
                exists: Some(self.install_layout().is_installed(id)),
                ..Reply::ok()
            },
            Err(reply) => reply,
        }
    }

    pub async fn augment_config(&self, raw_id: &str) -> Reply {
        let id = match parse_id(raw_id) {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        let augmenter = Arc::clone(&self.augmenter);
        match tokio::task::spawn_blocking(move || augmenter.augment(id)).await {
            Ok(Ok(outcome)) => Reply {
                message: Some(outcome.message()),
                ..Reply::ok()
            },
            Ok(Err(e)) => {
                tracing::warn!(appid = %id, "augment failed: {}", e);
                Reply::err(e)
            }
            Err(e) => Reply::err(e),
        }
    }

    pub async fn app_info(&self, raw_id: &str) -> Value {
        self.lookup(Lookup::App, raw_id, None).await
    }

    pub async fn app_price(&self, raw_id: &str, currency: Option<&str>) -> Value {
        self.lookup(Lookup::AppPrice, raw_id, currency).await
    }

    pub async fn achievement_groups(&self, raw_id: &str) -> Value {
        self.lookup(Lookup::AchievementGroups, raw_id, None).await
    }

    /// Remote JSON as-is, or an error reply.
    async fn lookup(&self, lookup: Lookup, raw_id: &str, currency: Option<&str>) -> Value {
        let id = match parse_id(raw_id) {
            Ok(id) => id,
            Err(reply) => return reply.to_value(),
        };
        let catalog = self.catalog.clone();
        let currency = currency.map(str::to_string);
        let fetched =
            tokio::task::spawn_blocking(move || catalog.fetch(lookup, id, currency.as_deref())).await;
        let body = match fetched {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::debug!(appid = %id, ?lookup, "catalog lookup failed: {}", e);
                return Reply::err(e).to_value();
            }
            Err(e) => return Reply::err(e).to_value(),
        };
        serde_json::from_str(&body)
            .unwrap_or_else(|e| Reply::err(format!("invalid catalog reply: {}", e)).to_value())
    }
}
