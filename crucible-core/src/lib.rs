//! Core types for the crucible sandboxed script execution engine.
//!
//! Defines the fundamental domain types: scripts, validation verdicts,
//! execution requests and outcomes, the canonical response shape, and the
//! process-wide sandbox configuration.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod request;
pub mod response;
pub mod script;
pub mod value;
pub mod verdict;

pub use config::{ResourceLimits, SandboxConfig};
pub use error::CoreError;
pub use ids::ExecutionId;
pub use outcome::ExecutionOutcome;
pub use request::{BackendKind, ExecutionRequest};
pub use response::ExecutionResponse;
pub use script::{Script, ScriptDigest};
pub use value::{ensure_json_value, JsonValueError};
pub use verdict::{RejectReason, ValidationVerdict};
