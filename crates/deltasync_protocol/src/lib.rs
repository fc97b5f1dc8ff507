//! # deltasync Protocol
//!
//! Document model, patch engine and version codecs for deltasync.
//!
//! This crate provides:
//! - `Document`, the fixed eight-leaf versioned document
//! - `LeafPath`, the closed set of addressable leaves
//! - `Patch` / `PatchOp` and the `diff` / `apply` engine
//! - `VersionStamp` and the Version Tag (ETag) codec
//! - HTTP-date parsing and formatting
//! - `ProtocolFlavor`, the two negotiation styles
//! - Header names, media types and header-value parsers for both
//!   negotiation flavors
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! # Round trip
//!
//! ```
//! use deltasync_protocol::{apply, diff, Document, LeafPath};
//!
//! let a = Document::default();
//! let mut b = a;
//! b.set(LeafPath::parse("/foo-b/bar-a/baz-b").unwrap(), 7);
//!
//! let patch = diff(&a, &b);
//! assert_eq!(patch.len(), 1);
//! assert_eq!(apply(&a, &patch).unwrap(), b);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod document;
mod error;
mod flavor;
pub mod headers;
mod http_date;
mod patch;
mod version;

pub use document::{Bar, Document, Foo, LeafPath, Side};
pub use error::{PatchError, PatchResult};
pub use flavor::ProtocolFlavor;
pub use http_date::{format_http_date, parse_http_date};
pub use patch::{apply, diff, Patch, PatchOp, PatchOpKind};
pub use version::{decode_tag, encode_tag, select_latest_tag, Snapshot, VersionStamp};
