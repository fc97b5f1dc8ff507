//! Benchmark utilities.

use deltasync_protocol::{Document, LeafPath, Snapshot, VersionStamp};
use deltasync_server::{HistoryRing, VersionedStore};
use rand::Rng;

/// Generate a document with random leaf values.
pub fn random_document() -> Document {
    let mut rng = rand::thread_rng();
    let mut doc = Document::new();
    for path in LeafPath::ALL {
        doc.set(path, rng.gen_range(0..1_000));
    }
    doc
}

/// Returns `doc` with `changes` leaves incremented, cycling through the
/// leaves in canonical order.
pub fn changed_document(doc: &Document, changes: usize) -> Document {
    let mut out = *doc;
    for path in LeafPath::ALL.into_iter().cycle().take(changes) {
        out.set(path, out.get(path) + 1);
    }
    out
}

/// Build a store and a full history of `len` consecutive versions stamped
/// 1..=len.
pub fn populated(len: usize) -> (VersionedStore, HistoryRing) {
    let store = VersionedStore::new();
    let history = HistoryRing::new(len);
    let mut doc = random_document();
    for i in 1..=len {
        doc = changed_document(&doc, 1 + i % LeafPath::ALL.len());
        let snapshot = Snapshot::new(doc, VersionStamp::from_nanos(i as i64));
        store.set(snapshot);
        history.push(snapshot);
    }
    (store, history)
}
