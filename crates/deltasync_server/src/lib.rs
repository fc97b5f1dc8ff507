//! # deltasync Server
//!
//! Reference HTTP delta server for deltasync.
//!
//! This crate provides:
//! - `VersionedStore`, the current document and its version stamp
//! - `HistoryRing`, a bounded newest-first record of past snapshots
//! - The negotiation procedure choosing full, unchanged or patch
//! - Rendering for both the delta (ETag/A-IM) and since flavors
//! - A background mutator and an axum router
//!
//! # Architecture
//!
//! A single writer (the mutator) updates the store and then the history.
//! Request handlers only read: the store once, the history at most once.
//! The history may lag the store; negotiation tolerates that.
//!
//! # Protocol
//!
//! ```text
//! GET /                                   -> 200 full document
//! GET / A-IM: jsonpatch, If-None-Match: t -> 304 unchanged
//!                                         -> 226 patch from Delta-Base
//!                                         -> 200 full (history too short)
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod history;
mod http;
mod mutator;
mod negotiate;
mod response;
mod server;
mod store;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use history::HistoryRing;
pub use http::router;
pub use mutator::{mutate, mutate_once, Mutator};
pub use negotiate::{negotiate, DeltaRequest, Negotiated};
pub use response::DeltaResponse;
pub use server::DeltaServer;
pub use store::VersionedStore;
