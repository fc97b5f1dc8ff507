//! # deltasync Client
//!
//! Polling client for deltasync servers.
//!
//! This crate provides:
//! - `LocalReplica`, the client's copy of the document and its baseline
//! - `Poller`, which claims the replica's baseline on every request and
//!   applies full documents or patches from the response
//! - Retry with exponential backoff
//! - HTTP client abstraction with a blocking reqwest implementation and a
//!   loopback implementation for tests
//!
//! ## Flavors
//!
//! - Delta: `A-IM: jsonpatch` and `If-None-Match: "<tag>"`; expects
//!   `200`, `226` or `304`
//! - Modified-since: `Get-Modified-Since` holding either the quoted tag or
//!   the HTTP-date of the last update; expects `200`
//!
//! A patch that does not fit the local document discards the baseline, so
//! the next poll fetches the whole document again.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod http;
mod poller;
mod replica;

pub use config::{ClientConfig, RetryConfig, SinceStyle};
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, HttpResponse, LoopbackClient, LoopbackServer, ReqwestClient};
pub use poller::{PollOutcome, PollStats, Poller};
pub use replica::{LocalReplica, ReplicaState};
