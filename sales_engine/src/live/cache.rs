use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use log::*;

use crate::{live::DeliveryReport, report::ReportSnapshot};

/// The change-gate slot a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKey {
    /// A user's own daily report.
    User(i64),
    /// The house report computed by the scheduler. Pushing it never updates the owner's personal slot.
    House,
}

/// The last snapshot pushed per slot.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshots: Mutex<HashMap<SnapshotKey, Arc<ReportSnapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SnapshotKey, Arc<ReportSnapshot>>> {
        self.snapshots.lock().unwrap_or_else(|poisoned| {
            error!("📸️ Snapshot cache lock was poisoned. Recovering the last known state.");
            poisoned.into_inner()
        })
    }

    pub fn get(&self, key: SnapshotKey) -> Option<Arc<ReportSnapshot>> {
        self.lock().get(&key).cloned()
    }

    /// Hands `snapshot` to `deliver` if it differs from the one held for `key`. Returns `None`, and leaves the cache
    /// untouched, when the two are equal.
    ///
    /// The snapshot is only stored once every connection has it. If any connection dropped it, the slot keeps its old
    /// value and the next equal snapshot is delivered again.
    pub fn deliver_if_changed<D>(&self, key: SnapshotKey, snapshot: ReportSnapshot, deliver: D) -> Option<DeliveryReport>
    where D: FnOnce(Arc<ReportSnapshot>) -> DeliveryReport {
        let mut snapshots = self.lock();
        if snapshots.get(&key).is_some_and(|current| **current == snapshot) {
            return None;
        }
        let snapshot = Arc::new(snapshot);
        let report = deliver(Arc::clone(&snapshot));
        if report.dropped.is_empty() {
            snapshots.insert(key, snapshot);
        } else {
            debug!("📸️ {} connection(s) missed the {key:?} report. It will be sent again.", report.dropped.len());
        }
        Some(report)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
