//! Background mutation of the served document.
//!
//! The mutator is the only writer of the store and history. Each tick it
//! increments one randomly chosen leaf and publishes the result as a new
//! snapshot with a strictly increasing stamp.

use crate::history::HistoryRing;
use crate::store::VersionedStore;
use deltasync_protocol::{Document, LeafPath, Side, Snapshot, VersionStamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Returns `document` with one leaf, chosen by three coin flips, incremented.
pub fn mutate<R: Rng>(document: &Document, rng: &mut R) -> Document {
    let mut side = || if rng.gen_bool(0.5) { Side::A } else { Side::B };
    let path = LeafPath::new(side(), side(), side());

    let mut out = *document;
    let leaf = out.leaf_mut(path);
    *leaf = leaf.wrapping_add(1);
    out
}

/// Publishes one mutation to `store` and `history`.
///
/// The store is updated first, then the history, using the same snapshot so
/// both agree on the stamp.
pub fn mutate_once<R: Rng>(
    store: &VersionedStore,
    history: &HistoryRing,
    rng: &mut R,
) -> Snapshot {
    let previous = store.get();
    let snapshot = Snapshot::new(
        mutate(&previous.document, rng),
        VersionStamp::now_after(previous.stamp),
    );
    store.set(snapshot);
    history.push(snapshot);
    debug!(stamp = %snapshot.stamp, "document mutated");
    snapshot
}

/// Periodic mutator task.
pub struct Mutator {
    store: Arc<VersionedStore>,
    history: Arc<HistoryRing>,
    interval: Duration,
    mutate_at_start: bool,
}

impl Mutator {
    /// Creates a mutator ticking every `interval`.
    pub fn new(store: Arc<VersionedStore>, history: Arc<HistoryRing>, interval: Duration) -> Self {
        Self {
            store,
            history,
            interval,
            mutate_at_start: false,
        }
    }

    /// Publishes a first mutation immediately instead of after one interval.
    pub fn with_mutate_at_start(mut self, enabled: bool) -> Self {
        self.mutate_at_start = enabled;
        self
    }

    /// Spawns the mutator on the current tokio runtime.
    ///
    /// The task runs until aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut rng = StdRng::from_entropy();
        if self.mutate_at_start {
            mutate_once(&self.store, &self.history, &mut rng);
        }

        // Zero would make tokio panic.
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            mutate_once(&self.store, &self.history, &mut rng);
        }
    }
}
