//! The latest known document state.

use deltasync_protocol::Snapshot;
use parking_lot::Mutex;

/// Thread-safe holder of the current [`Snapshot`].
///
/// Starts at the zero snapshot. Readers get a copy, so a concurrent `set`
/// never affects a read already in flight. No history is kept here.
#[derive(Debug, Default)]
pub struct VersionedStore {
    current: Mutex<Snapshot>,
}

impl VersionedStore {
    /// Creates a store holding the zero snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current snapshot.
    pub fn get(&self) -> Snapshot {
        *self.current.lock()
    }

    /// Replaces the current snapshot.
    pub fn set(&self, snapshot: Snapshot) {
        *self.current.lock() = snapshot;
    }
}
