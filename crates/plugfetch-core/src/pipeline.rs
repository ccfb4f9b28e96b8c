//! Acquisition pipeline: fetch from mirrors, select the payload, patch it, install it.
//!
//! One tokio task per accepted request; the blocking phases (curl, zip, file
//! writes) run on `spawn_blocking`. Every phase transition is published to the
//! job store so pollers see live progress.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::archive::select_payload;
use crate::checksum;
use crate::error::AcquireError;
use crate::fetch::{fetch_from_mirrors, StagedArchive};
use crate::http::HttpClient;
use crate::install::{install_payload, InstallLayout};
use crate::jobs::{AppId, InFlightGuard, JobStatus, JobStore, JobUpdate};
use crate::mirrors::MirrorList;
use crate::patch::DirectivePatch;
use crate::storage;

/// Why a start request was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    #[error("acquisition already in progress")]
    AlreadyRunning,
}

/// Everything one acquisition needs; shared by all tasks.
pub struct Acquirer {
    client: HttpClient,
    store: Arc<JobStore>,
    mirrors: MirrorList,
    layout: InstallLayout,
    staging_dir: PathBuf,
    patch: DirectivePatch,
}

impl Acquirer {
    pub fn new(
        client: HttpClient,
        store: Arc<JobStore>,
        mirrors: MirrorList,
        layout: InstallLayout,
        staging_dir: PathBuf,
        patch: DirectivePatch,
    ) -> Self {
        Acquirer {
            client,
            store,
            mirrors,
            layout,
            staging_dir,
            patch,
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Accept a request: reset the record to `queued` and spawn the task on `handle`.
    /// Returns without touching the network. A request for an id whose task is
    /// still running is rejected and the running record is left alone.
    pub fn start(self: &Arc<Self>, handle: &Handle, id: AppId) -> Result<(), StartError> {
        let guard = self.store.try_begin(id).ok_or(StartError::AlreadyRunning)?;
        let staging = storage::staging_path(&self.staging_dir, id);
        self.store.reset(id);
        self.store.set(id, JobUpdate::status(JobStatus::Queued).with_destination(staging));
        tracing::info!(appid = %id, mirrors = self.mirrors.len(), "acquisition queued");

        let this = Arc::clone(self);
        handle.spawn(async move { this.run(guard).await });
        Ok(())
    }

    /// Drive one job to a terminal state. The guard is released on return.
    async fn run(self: Arc<Self>, guard: InFlightGuard) {
        let id = guard.id();
        let outcome = self.acquire(id).await;
        match outcome {
            Ok(installed) => {
                self.store.set(
                    id,
                    JobUpdate::status(JobStatus::Done).with_installed(installed.clone()),
                );
                tracing::info!(appid = %id, "acquisition done -> {}", installed.display());
            }
            Err(e) => {
                let message = failure_message(&e);
                tracing::warn!(appid = %id, "acquisition failed: {}", message);
                self.store.set(id, JobUpdate::failed(message));
            }
        }
        drop(guard);
    }

    async fn acquire(self: &Arc<Self>, id: AppId) -> Result<PathBuf, AcquireError> {
        let this = Arc::clone(self);
        let staged = tokio::task::spawn_blocking(move || this.download(id))
            .await
            .map_err(|e| AcquireError::Task(e.to_string()))??;

        let this = Arc::clone(self);
        tokio::task::spawn_blocking(move || this.process(id, staged))
            .await
            .map_err(|e| AcquireError::Task(e.to_string()))?
    }

    fn download(&self, id: AppId) -> Result<StagedArchive, AcquireError> {
        let candidates = self.mirrors.resolve(id);
        let staging = storage::staging_path(&self.staging_dir, id);
        fetch_from_mirrors(&self.client, &self.store, id, &candidates, staging)
    }

    /// Select, patch and install. No further mirrors are tried after a failure here.
    fn process(&self, id: AppId, staged: StagedArchive) -> Result<PathBuf, AcquireError> {
        self.store.set(id, JobUpdate::status(JobStatus::Processing));

        let digest = checksum::sha256_path(&staged.path).map_err(AcquireError::malformed)?;
        tracing::debug!(
            appid = %id,
            mirror = staged.mirror_index,
            sha256 = %digest,
            bytes = staged.bytes,
            "staged archive"
        );
        self.store.set(
            id,
            JobUpdate {
                archive_sha256: Some(digest),
                ..JobUpdate::default()
            },
        );

        let payload = select_payload(&staged.path, id, self.layout.payload_ext())?;
        let patched = self.patch.apply(&payload.text);
        tracing::debug!(
            appid = %id,
            entry = %payload.entry_name,
            patched_lines = self.patch.count_active(&payload.text),
            "payload selected"
        );
        self.store.set(
            id,
            JobUpdate {
                status: Some(JobStatus::Installing),
                payload_entry: Some(payload.entry_name),
                ..JobUpdate::default()
            },
        );

        install_payload(&self.layout, id, &patched)
    }
}

/// Text stored in `errorMessage` for a failed job.
pub fn failure_message(err: &AcquireError) -> String {
    match err {
        AcquireError::AllSourcesExhausted => err.to_string(),
        other => format!("Processing failed: {}", other),
    }
}
