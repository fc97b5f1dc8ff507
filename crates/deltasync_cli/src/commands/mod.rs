//! CLI command implementations.

pub mod poll;
pub mod serve;
