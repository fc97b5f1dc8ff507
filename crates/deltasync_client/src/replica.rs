//! The client's local copy of the document.

use deltasync_protocol::{Document, VersionStamp};
use parking_lot::RwLock;

/// A copy of the replica's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicaState {
    /// The local document.
    pub document: Document,
    /// Unquoted tag of the version held, if any.
    pub tag: Option<String>,
    /// When the version held was produced, if known.
    pub modified: Option<VersionStamp>,
}

impl ReplicaState {
    /// Returns true if the replica holds a version it can claim.
    pub fn has_baseline(&self) -> bool {
        self.tag.is_some() || self.modified.is_some()
    }
}

/// Thread-safe local replica.
///
/// Readers get a copy; a concurrent `set` never affects a read in flight.
#[derive(Debug, Default)]
pub struct LocalReplica {
    state: RwLock<ReplicaState>,
}

impl LocalReplica {
    /// Creates an empty replica with no baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current state.
    pub fn get(&self) -> ReplicaState {
        self.state.read().clone()
    }

    /// Returns a copy of the local document.
    pub fn document(&self) -> Document {
        self.state.read().document
    }

    /// Returns the unquoted tag of the version held.
    pub fn tag(&self) -> Option<String> {
        self.state.read().tag.clone()
    }

    /// Replaces the document and its version markers.
    pub fn set(&self, document: Document, tag: Option<String>, modified: Option<VersionStamp>) {
        *self.state.write() = ReplicaState {
            document,
            tag,
            modified,
        };
    }

    /// Forgets the baseline so the next poll requests the full document.
    ///
    /// The document itself is kept.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.tag = None;
        state.modified = None;
    }
}
