//! Error types for the engine crate.
//!
//! These cover probing and launch plumbing only. Script-caused failures are
//! never errors at this level: backends fold them into
//! [`ExecutionOutcome`](crucible_core::ExecutionOutcome) so nothing propagates
//! as an unhandled fault past the dispatcher.

use std::path::PathBuf;

/// Errors that can occur while probing or preparing a backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A required binary was not found at its configured path or in PATH.
    #[error("binary not found at {path}")]
    BinaryNotFound { path: PathBuf },

    /// The host refused the namespace/privilege operations isolation needs.
    #[error("isolation unavailable: {reason}")]
    IsolationUnavailable { reason: String },

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
