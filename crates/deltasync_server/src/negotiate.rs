//! The negotiation procedure.
//!
//! Given a client's claimed baseline, decide between a full document, an
//! "unchanged" signal and a patch. The decision is the same for both
//! protocol flavors; only the rendering differs (see
//! [`Negotiated::render`](crate::Negotiated::render)).
//!
//! Evaluation order:
//! 1. no baseline, or no patch capability: FULL
//! 2. current stamp not after the baseline: UNCHANGED
//! 3. history cannot reach back to the baseline: FULL
//! 4. otherwise: PATCH from the history baseline to the current document

use crate::history::HistoryRing;
use crate::store::VersionedStore;
use deltasync_protocol::headers::{accepts_json_patch, latest_if_none_match, parse_get_modified_since};
use deltasync_protocol::{diff, Patch, Snapshot, VersionStamp};
use tracing::{debug, warn};

/// What a client told us about the version it holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaRequest {
    /// Whether the client accepts patch responses.
    pub accepts_patch: bool,
    /// The version the client claims to hold.
    pub baseline: Option<VersionStamp>,
}

impl DeltaRequest {
    /// A request with no baseline claim.
    pub fn full() -> Self {
        Self::default()
    }

    /// A patch-capable request claiming `baseline`.
    pub fn since(baseline: VersionStamp) -> Self {
        Self {
            accepts_patch: true,
            baseline: Some(baseline),
        }
    }

    /// Builds a request from `A-IM` and `If-None-Match` header values.
    ///
    /// Candidate tags are only considered when `A-IM` lists `jsonpatch`.
    /// The newest decodable candidate becomes the baseline.
    pub fn from_delta_headers<'a, A, I>(a_im: A, if_none_match: I) -> Self
    where
        A: IntoIterator<Item = &'a str>,
        I: IntoIterator<Item = &'a str>,
    {
        if !accepts_json_patch(a_im) {
            return Self::full();
        }
        let baseline = latest_if_none_match(if_none_match).map(|(_, stamp)| stamp);
        Self {
            accepts_patch: true,
            baseline,
        }
    }

    /// Builds a request from a `Get-Modified-Since` header value.
    ///
    /// The header itself declares patch capability. An unparsable value is
    /// ignored.
    pub fn from_get_modified_since(value: Option<&str>) -> Self {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            return Self::full();
        };
        match parse_get_modified_since(value) {
            Some(stamp) => Self::since(stamp),
            None => {
                warn!(value, "Get-Modified-Since is neither a quoted tag nor an HTTP-date; ignoring");
                Self::full()
            }
        }
    }
}

/// Outcome of negotiation.
#[derive(Debug, Clone, PartialEq)]
pub enum Negotiated {
    /// Send the whole current document.
    Full {
        /// The current snapshot.
        current: Snapshot,
    },
    /// Nothing changed since the client's baseline.
    Unchanged {
        /// The current snapshot.
        current: Snapshot,
    },
    /// Send the changes from `base` to `current`.
    Patch {
        /// The current snapshot.
        current: Snapshot,
        /// The history snapshot the patch was computed against.
        base: Snapshot,
        /// `diff(base, current)`.
        patch: Patch,
    },
}

impl Negotiated {
    /// Returns the current snapshot the response describes.
    pub fn current(&self) -> &Snapshot {
        match self {
            Negotiated::Full { current }
            | Negotiated::Unchanged { current }
            | Negotiated::Patch { current, .. } => current,
        }
    }

    /// Returns a short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Negotiated::Full { .. } => "full",
            Negotiated::Unchanged { .. } => "unchanged",
            Negotiated::Patch { .. } => "patch",
        }
    }
}

/// Runs the negotiation procedure.
///
/// Reads the store once and the history at most once. The history may lag
/// the store; it is only ever used as a source of some older baseline.
pub fn negotiate(request: &DeltaRequest, store: &VersionedStore, history: &HistoryRing) -> Negotiated {
    let current = store.get();

    let claimed = match request.baseline {
        Some(claimed) if request.accepts_patch => claimed,
        _ => {
            debug!("no usable baseline claimed, sending full document");
            return Negotiated::Full { current };
        }
    };

    if current.stamp <= claimed {
        debug!(current = %current.stamp, %claimed, "unchanged since claimed baseline");
        return Negotiated::Unchanged { current };
    }

    let base = history.query_baseline(claimed);
    if base.is_zero() || base.stamp > claimed {
        debug!(%claimed, "history does not reach claimed baseline, sending full document");
        return Negotiated::Full { current };
    }

    let patch = diff(&base.document, &current.document);
    debug!(base = %base.stamp, current = %current.stamp, ops = patch.len(), "sending patch");
    Negotiated::Patch {
        current,
        base,
        patch,
    }
}
