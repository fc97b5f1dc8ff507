//! Structural diff and patch over [`Document`].
//!
//! The engine supports exactly one operation kind, `replace`, over the eight
//! fixed leaves. A [`Patch`] serializes as a JSON Patch array:
//!
//! ```json
//! [{"op": "replace", "path": "/foo-a/bar-a/baz-a", "value": 3}]
//! ```

use crate::document::{Document, LeafPath};
use crate::error::{PatchError, PatchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation name. Only `replace` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOpKind {
    /// Overwrite the leaf at `path` with `value`.
    Replace,
}

/// A single patch operation as carried on the wire.
///
/// `path` and `value` are kept in their raw form so that a received patch
/// can be validated with a descriptive error rather than failing to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    /// Operation name.
    pub op: PatchOpKind,
    /// Slash-delimited leaf path.
    pub path: String,
    /// New leaf value.
    pub value: Value,
}

impl PatchOp {
    /// Creates a replace operation for a known leaf.
    pub fn replace(path: LeafPath, value: i64) -> Self {
        Self {
            op: PatchOpKind::Replace,
            path: path.pointer(),
            value: Value::from(value),
        }
    }

    /// Validates this operation, returning the target leaf and value.
    pub fn resolve(&self) -> PatchResult<(LeafPath, i64)> {
        let path = LeafPath::parse(&self.path)?;
        let value = leaf_value(&self.value).ok_or_else(|| PatchError::UnsupportedValue {
            path: self.path.clone(),
            value: self.value.to_string(),
        })?;
        Ok((path, value))
    }
}

/// Converts a JSON value into a leaf integer.
///
/// Integral floats within range are accepted, since some encoders emit all
/// numbers as doubles.
fn leaf_value(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// An ordered list of leaf replacements.
///
/// An empty patch means "no observable change".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(Vec<PatchOp>);

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an operation.
    pub fn push(&mut self, op: PatchOp) {
        self.0.push(op);
    }

    /// Returns the number of operations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the patch has no operations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the operations in order.
    pub fn ops(&self) -> &[PatchOp] {
        &self.0
    }

    /// Serializes to the JSON Patch wire form.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parses the JSON Patch wire form.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

impl From<Vec<PatchOp>> for Patch {
    fn from(ops: Vec<PatchOp>) -> Self {
        Self(ops)
    }
}

impl FromIterator<PatchOp> for Patch {
    fn from_iter<I: IntoIterator<Item = PatchOp>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Patch {
    type Item = PatchOp;
    type IntoIter = std::vec::IntoIter<PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOp;
    type IntoIter = std::slice::Iter<'a, PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Computes the replacements that turn `a` into `b`.
///
/// Operations appear in canonical leaf order and carry `b`'s values.
pub fn diff(a: &Document, b: &Document) -> Patch {
    a.leaves()
        .zip(b.leaves())
        .filter(|((_, old), (_, new))| old != new)
        .map(|(_, (path, new))| PatchOp::replace(path, new))
        .collect()
}

/// Applies `patch` to a copy of `doc`.
///
/// Every operation is validated before the copy is returned; on error the
/// partially updated copy is dropped and `doc` is untouched.
pub fn apply(doc: &Document, patch: &Patch) -> PatchResult<Document> {
    let mut out = *doc;
    for op in patch {
        let (path, value) = op.resolve()?;
        out.set(path, value);
    }
    Ok(out)
}
