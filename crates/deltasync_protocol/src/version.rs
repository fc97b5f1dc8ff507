//! Version stamps, snapshots and the Version Tag codec.
//!
//! A [`VersionStamp`] is a nanosecond timestamp that totally orders document
//! revisions. Its wire form, the Version Tag, is the decimal nanosecond count
//! since the Unix epoch. Tags that fail to parse decode to `None`; callers
//! ignore them rather than failing the request.

use crate::document::Document;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A point in time identifying one document revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionStamp(i64);

impl VersionStamp {
    /// The zero stamp, used before the first revision exists.
    pub const ZERO: VersionStamp = VersionStamp(0);

    /// Creates a stamp from nanoseconds since the Unix epoch.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Returns nanoseconds since the Unix epoch.
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Returns true for [`VersionStamp::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the current wall-clock time.
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Self(nanos)
    }

    /// Returns the current time, or one nanosecond after `previous` if the
    /// clock has not advanced past it.
    pub fn now_after(previous: VersionStamp) -> Self {
        Self::now().max(Self(previous.0.saturating_add(1)))
    }

    /// Returns the stamp truncated to whole seconds.
    pub fn truncate_to_secs(&self) -> Self {
        Self(self.0.div_euclid(1_000_000_000) * 1_000_000_000)
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encodes a stamp as a Version Tag.
pub fn encode_tag(stamp: VersionStamp) -> String {
    stamp.0.to_string()
}

/// Decodes a Version Tag. Malformed tags yield `None`.
pub fn decode_tag(tag: &str) -> Option<VersionStamp> {
    tag.parse::<i64>().ok().map(VersionStamp)
}

/// Selects the candidate tag with the latest stamp.
///
/// Malformed candidates are skipped. Returns `None` if no candidate decodes.
/// On equal stamps the first candidate wins.
pub fn select_latest_tag<'a, I>(candidates: I) -> Option<(&'a str, VersionStamp)>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter_map(|tag| decode_tag(tag).map(|stamp| (tag, stamp)))
        .fold(None, |best, (tag, stamp)| match best {
            Some((_, best_stamp)) if best_stamp >= stamp => best,
            _ => Some((tag, stamp)),
        })
}

/// A document value as of a stamp.
///
/// Snapshots are never edited in place; a mutation produces a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// The document.
    pub document: Document,
    /// When this revision was produced.
    pub stamp: VersionStamp,
}

impl Snapshot {
    /// Creates a snapshot.
    pub fn new(document: Document, stamp: VersionStamp) -> Self {
        Self { document, stamp }
    }

    /// Creates a snapshot stamped with the current time.
    pub fn now(document: Document) -> Self {
        Self::new(document, VersionStamp::now())
    }

    /// The zero-value snapshot: zero document, zero stamp.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns true if this is the zero-value sentinel.
    pub fn is_zero(&self) -> bool {
        self.stamp.is_zero() && self.document == Document::default()
    }

    /// Returns this snapshot's Version Tag.
    pub fn tag(&self) -> String {
        encode_tag(self.stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_is_decimal_nanos() {
        assert_eq!(encode_tag(VersionStamp::from_nanos(1_500_000_000_123)), "1500000000123");
        assert_eq!(encode_tag(VersionStamp::ZERO), "0");
    }

    #[test]
    fn malformed_tags_are_absent() {
        assert_eq!(decode_tag("not-a-number"), None);
        assert_eq!(decode_tag(""), None);
        assert_eq!(decode_tag("\"12\""), None);
        assert_eq!(decode_tag("1.5"), None);
        assert_eq!(decode_tag("99999999999999999999"), None);
    }

    #[test]
    fn selects_latest_and_ignores_malformed() {
        let selected = select_latest_tag(["1", "not-a-number", "100"]);
        assert_eq!(selected, Some(("100", VersionStamp::from_nanos(100))));

        let selected = select_latest_tag(["100", "1"]);
        assert_eq!(selected, Some(("100", VersionStamp::from_nanos(100))));
    }

    #[test]
    fn no_candidates_means_no_baseline() {
        assert_eq!(select_latest_tag(Vec::<&str>::new()), None);
        assert_eq!(select_latest_tag(["x", "y"]), None);
    }

    #[test]
    fn now_after_is_strictly_increasing() {
        let future = VersionStamp::from_nanos(i64::MAX - 10);
        assert_eq!(VersionStamp::now_after(future), VersionStamp::from_nanos(i64::MAX - 9));

        let a = VersionStamp::now();
        let b = VersionStamp::now_after(a);
        assert!(b > a);
    }

    #[test]
    fn truncation() {
        let stamp = VersionStamp::from_nanos(1_700_000_000_987_654_321);
        assert_eq!(stamp.truncate_to_secs().as_nanos(), 1_700_000_000_000_000_000);
    }

    #[test]
    fn zero_snapshot_sentinel() {
        assert!(Snapshot::zero().is_zero());
        assert!(!Snapshot::now(Document::new()).is_zero());
        assert_eq!(Snapshot::zero().tag(), "0");
    }

    proptest! {
        #[test]
        fn tag_round_trips(nanos in any::<i64>()) {
            let stamp = VersionStamp::from_nanos(nanos);
            prop_assert_eq!(decode_tag(&encode_tag(stamp)), Some(stamp));
        }

        #[test]
        fn tag_is_injective(a in any::<i64>(), b in any::<i64>()) {
            prop_assume!(a != b);
            prop_assert_ne!(
                encode_tag(VersionStamp::from_nanos(a)),
                encode_tag(VersionStamp::from_nanos(b))
            );
        }
    }
}
