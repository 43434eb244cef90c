//! HTTP API gateway for the crucible script execution engine.
//!
//! A thin wrapper: request parsing, one dispatch call, status mapping. All
//! sandboxing, validation, and normalization live in `crucible-engine`.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod routes;
pub mod settings;
