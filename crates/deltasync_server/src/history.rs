//! Bounded history of past snapshots.

use deltasync_protocol::{Document, Snapshot, VersionStamp};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::debug;

/// Thread-safe, newest-first, size-bounded record of past snapshots.
///
/// Used to find a baseline at or before what a client last saw, so a patch
/// can be computed against it. Entries are never reordered or modified once
/// inserted; inserting beyond capacity evicts the oldest.
///
/// The ring may lag the [`VersionedStore`](crate::VersionedStore) briefly,
/// since the two are updated without a shared lock.
#[derive(Debug)]
pub struct HistoryRing {
    /// Newest at the front.
    entries: Mutex<VecDeque<Snapshot>>,
    capacity: usize,
}

impl HistoryRing {
    /// Creates an empty ring holding at most `capacity` snapshots.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }

    /// Returns the capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of retained snapshots.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Records `document` stamped with the current time.
    ///
    /// Returns the recorded snapshot.
    pub fn record(&self, document: Document) -> Snapshot {
        let snapshot = Snapshot::now(document);
        self.push(snapshot);
        snapshot
    }

    /// Records an already-stamped snapshot.
    ///
    /// Callers must push stamps in non-decreasing order to keep the ring
    /// time-ordered.
    pub fn push(&self, snapshot: Snapshot) {
        let mut entries = self.entries.lock();
        entries.push_front(snapshot);
        entries.truncate(self.capacity);
    }

    /// Returns the newest snapshot stamped at or before `t`.
    ///
    /// If every retained snapshot is newer than `t`, the oldest one is
    /// returned; the caller sees its stamp is after `t` and knows history
    /// does not reach back that far. An empty ring yields the zero snapshot.
    pub fn query_baseline(&self, t: VersionStamp) -> Snapshot {
        let entries = self.entries.lock();
        if let Some(found) = entries.iter().find(|s| s.stamp <= t) {
            debug!(stamp = %found.stamp, claimed = %t, "history baseline found");
            return *found;
        }
        match entries.back() {
            Some(oldest) => {
                debug!(oldest = %oldest.stamp, claimed = %t, "claimed baseline predates history");
                *oldest
            }
            None => {
                debug!(claimed = %t, "history empty");
                Snapshot::zero()
            }
        }
    }

    /// Returns a copy of all retained snapshots, newest first.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.entries.lock().iter().copied().collect()
    }
}
