//! In-memory job state store shared between acquisition tasks and pollers.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::types::{AppId, JobRecord, JobUpdate};

/// Map of app id -> latest job record, plus the set of ids with a running task.
///
/// Every operation holds the map lock only for a single lookup/replace, so
/// independent ids never wait on each other's network or disk work.
#[derive(Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<AppId, JobRecord>>,
    in_flight: Mutex<HashSet<AppId>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // Records are replaced whole, so a panic mid-update cannot leave one half-written.
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `update` into the record for `id`, creating a default record if absent.
    pub fn set(&self, id: AppId, update: JobUpdate) {
        let mut jobs = lock(&self.jobs);
        let mut record = jobs.get(&id).cloned().unwrap_or_default();
        update.apply(&mut record);
        jobs.insert(id, record);
    }

    /// Replace the record for `id` with a fresh `queued` one.
    pub fn reset(&self, id: AppId) {
        lock(&self.jobs).insert(id, JobRecord::queued());
    }

    /// Snapshot of the record for `id`; the default (`unknown`) record if never started.
    pub fn get(&self, id: AppId) -> JobRecord {
        lock(&self.jobs).get(&id).cloned().unwrap_or_default()
    }

    /// Ids that currently have a record, sorted.
    pub fn ids(&self) -> Vec<AppId> {
        let mut ids: Vec<AppId> = lock(&self.jobs).keys().copied().collect();
        ids.sort();
        ids
    }

    /// Claim `id` for a new acquisition task. Returns `None` if one is already running.
    /// The returned guard releases the claim when dropped.
    pub fn try_begin(self: &Arc<Self>, id: AppId) -> Option<InFlightGuard> {
        if !lock(&self.in_flight).insert(id) {
            return None;
        }
        Some(InFlightGuard {
            store: Arc::clone(self),
            id,
        })
    }

    pub fn is_in_flight(&self, id: AppId) -> bool {
        lock(&self.in_flight).contains(&id)
    }

    fn finish(&self, id: AppId) {
        lock(&self.in_flight).remove(&id);
    }
}

/// Releases an in-flight claim when dropped (task end, success, failure or panic).
pub struct InFlightGuard {
    store: Arc<JobStore>,
    id: AppId,
}

impl InFlightGuard {
    pub fn id(&self) -> AppId {
        self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.store.finish(self.id);
    }
}
