//! The versioned document and its fixed leaf layout.
//!
//! A [`Document`] is a three-level tree: two `foo` branches, each holding
//! two `bar` branches, each holding two `baz` integer leaves. The shape never
//! changes; only leaf values do. Leaves are addressed by [`LeafPath`], a
//! closed set of exactly eight paths.

use crate::error::{PatchError, PatchResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The versioned document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    /// First top-level branch.
    #[serde(rename = "foo-a")]
    pub foo_a: Foo,
    /// Second top-level branch.
    #[serde(rename = "foo-b")]
    pub foo_b: Foo,
}

/// A top-level branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Foo {
    /// First mid-level branch.
    #[serde(rename = "bar-a")]
    pub bar_a: Bar,
    /// Second mid-level branch.
    #[serde(rename = "bar-b")]
    pub bar_b: Bar,
}

/// A mid-level branch holding two leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bar {
    /// First leaf.
    #[serde(rename = "baz-a")]
    pub baz_a: i64,
    /// Second leaf.
    #[serde(rename = "baz-b")]
    pub baz_b: i64,
}

/// Which of the two children at a tree level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    /// The `-a` child.
    A,
    /// The `-b` child.
    B,
}

impl Side {
    fn suffix(self) -> &'static str {
        match self {
            Side::A => "a",
            Side::B => "b",
        }
    }

    /// Parses `<prefix>-a` / `<prefix>-b`.
    fn parse(segment: &str, prefix: &str) -> Option<Self> {
        match segment.strip_prefix(prefix)?.strip_prefix('-')? {
            "a" => Some(Side::A),
            "b" => Some(Side::B),
            _ => None,
        }
    }
}

/// Address of one of the eight leaves.
///
/// Ordering follows the canonical diff order: branch A before B, then
/// sub-branch A before B, then leaf A before B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafPath {
    /// Top-level branch (`foo-a` / `foo-b`).
    pub foo: Side,
    /// Mid-level branch (`bar-a` / `bar-b`).
    pub bar: Side,
    /// Leaf (`baz-a` / `baz-b`).
    pub baz: Side,
}

impl LeafPath {
    /// All leaf paths in canonical order.
    pub const ALL: [LeafPath; 8] = [
        LeafPath::new(Side::A, Side::A, Side::A),
        LeafPath::new(Side::A, Side::A, Side::B),
        LeafPath::new(Side::A, Side::B, Side::A),
        LeafPath::new(Side::A, Side::B, Side::B),
        LeafPath::new(Side::B, Side::A, Side::A),
        LeafPath::new(Side::B, Side::A, Side::B),
        LeafPath::new(Side::B, Side::B, Side::A),
        LeafPath::new(Side::B, Side::B, Side::B),
    ];

    /// Creates a leaf path.
    pub const fn new(foo: Side, bar: Side, baz: Side) -> Self {
        Self { foo, bar, baz }
    }

    /// Returns the three segment names, e.g. `["foo-a", "bar-b", "baz-a"]`.
    pub fn segments(&self) -> [String; 3] {
        [
            format!("foo-{}", self.foo.suffix()),
            format!("bar-{}", self.bar.suffix()),
            format!("baz-{}", self.baz.suffix()),
        ]
    }

    /// Returns the slash-delimited wire form, e.g. `/foo-a/bar-b/baz-a`.
    pub fn pointer(&self) -> String {
        let [foo, bar, baz] = self.segments();
        format!("/{}/{}/{}", foo, bar, baz)
    }

    /// Parses the wire form.
    ///
    /// The path must start with `/` and have exactly three segments, each
    /// naming a known branch or leaf at its depth.
    pub fn parse(path: &str) -> PatchResult<Self> {
        let rest = path
            .strip_prefix('/')
            .ok_or_else(|| PatchError::NotAbsolute(path.to_string()))?;

        let segments: Vec<&str> = rest.split('/').collect();
        let [foo, bar, baz] = segments[..] else {
            return Err(PatchError::PathDepth {
                path: path.to_string(),
                segments: segments.len(),
            });
        };

        let unknown = |segment: &str| PatchError::UnknownSegment {
            segment: segment.to_string(),
            path: path.to_string(),
        };

        Ok(Self {
            foo: Side::parse(foo, "foo").ok_or_else(|| unknown(foo))?,
            bar: Side::parse(bar, "bar").ok_or_else(|| unknown(bar))?,
            baz: Side::parse(baz, "baz").ok_or_else(|| unknown(baz))?,
        })
    }
}

impl fmt::Display for LeafPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pointer())
    }
}

impl Document {
    /// Creates the zero-value document.
    pub fn new() -> Self {
        Self::default()
    }

    fn bar(&self, path: LeafPath) -> &Bar {
        let foo = match path.foo {
            Side::A => &self.foo_a,
            Side::B => &self.foo_b,
        };
        match path.bar {
            Side::A => &foo.bar_a,
            Side::B => &foo.bar_b,
        }
    }

    fn bar_mut(&mut self, path: LeafPath) -> &mut Bar {
        let foo = match path.foo {
            Side::A => &mut self.foo_a,
            Side::B => &mut self.foo_b,
        };
        match path.bar {
            Side::A => &mut foo.bar_a,
            Side::B => &mut foo.bar_b,
        }
    }

    /// Reads the leaf at `path`.
    pub fn get(&self, path: LeafPath) -> i64 {
        let bar = self.bar(path);
        match path.baz {
            Side::A => bar.baz_a,
            Side::B => bar.baz_b,
        }
    }

    /// Returns a mutable reference to the leaf at `path`.
    pub fn leaf_mut(&mut self, path: LeafPath) -> &mut i64 {
        let bar = self.bar_mut(path);
        match path.baz {
            Side::A => &mut bar.baz_a,
            Side::B => &mut bar.baz_b,
        }
    }

    /// Overwrites the leaf at `path`.
    pub fn set(&mut self, path: LeafPath, value: i64) {
        *self.leaf_mut(path) = value;
    }

    /// Iterates all leaves with their values, in canonical order.
    pub fn leaves(&self) -> impl Iterator<Item = (LeafPath, i64)> + '_ {
        LeafPath::ALL
            .into_iter()
            .map(move |path| (path, self.get(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_document_has_zero_leaves() {
        let doc = Document::new();
        assert!(doc.leaves().all(|(_, v)| v == 0));
        assert_eq!(doc.leaves().count(), 8);
    }

    #[test]
    fn canonical_order_matches_sorted_order() {
        let mut sorted = LeafPath::ALL;
        sorted.sort();
        assert_eq!(sorted, LeafPath::ALL);
        assert_eq!(LeafPath::ALL[0].pointer(), "/foo-a/bar-a/baz-a");
        assert_eq!(LeafPath::ALL[1].pointer(), "/foo-a/bar-a/baz-b");
        assert_eq!(LeafPath::ALL[2].pointer(), "/foo-a/bar-b/baz-a");
        assert_eq!(LeafPath::ALL[7].pointer(), "/foo-b/bar-b/baz-b");
    }

    #[test]
    fn each_path_addresses_a_distinct_leaf() {
        let mut doc = Document::new();
        for (i, path) in LeafPath::ALL.iter().enumerate() {
            doc.set(*path, i as i64 + 1);
        }
        for (i, (path, value)) in doc.leaves().enumerate() {
            assert_eq!(path, LeafPath::ALL[i]);
            assert_eq!(value, i as i64 + 1);
        }
        assert_eq!(doc.foo_b.bar_a.baz_b, 6);
    }

    #[test]
    fn parse_round_trips_every_path() {
        for path in LeafPath::ALL {
            assert_eq!(LeafPath::parse(&path.pointer()).unwrap(), path);
        }
    }

    #[test]
    fn parse_rejects_wrong_depth() {
        assert_eq!(
            LeafPath::parse("/foo-a/bar-a"),
            Err(PatchError::PathDepth {
                path: "/foo-a/bar-a".into(),
                segments: 2
            })
        );
        assert!(matches!(
            LeafPath::parse("/foo-a/bar-a/baz-a/extra"),
            Err(PatchError::PathDepth { segments: 4, .. })
        ));
        assert!(matches!(
            LeafPath::parse("foo-a/bar-a/baz-a"),
            Err(PatchError::NotAbsolute(_))
        ));
    }

    #[test]
    fn parse_rejects_unknown_segments() {
        assert_eq!(
            LeafPath::parse("/foo-a/unknown-b/baz-a"),
            Err(PatchError::UnknownSegment {
                segment: "unknown-b".into(),
                path: "/foo-a/unknown-b/baz-a".into(),
            })
        );
        // Segment names are tied to their depth.
        assert!(LeafPath::parse("/bar-a/foo-a/baz-a").is_err());
        assert!(LeafPath::parse("/foo-c/bar-a/baz-a").is_err());
        assert!(LeafPath::parse("/foo-a/bar-a/").is_err());
    }

    #[test]
    fn json_uses_hyphenated_labels() {
        let mut doc = Document::new();
        doc.foo_a.bar_b.baz_a = 3;
        let json = serde_json::to_value(doc).unwrap();
        assert_eq!(json["foo-a"]["bar-b"]["baz-a"], 3);
        assert_eq!(json["foo-b"]["bar-a"]["baz-b"], 0);

        let back: Document = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
