//! Terminal execution outcomes.

use serde::{Deserialize, Serialize};

/// The single terminal outcome of one execution attempt.
///
/// Produced exactly once per [`ExecutionRequest`](crate::ExecutionRequest) by
/// whichever backend ran it; a late-arriving timeout after a success (or vice
/// versa) must be a no-op at the producing site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ExecutionOutcome {
    /// The entry point returned a JSON-serializable value.
    Success {
        /// The returned value, already checked against the JSON predicate.
        value: serde_json::Value,
        /// Everything the script wrote to standard output.
        stdout: String,
    },
    /// The script raised, returned a non-serializable value, or exited badly.
    RuntimeError {
        /// Sanitized single-line description of the failure.
        message: String,
        /// Standard output captured up to the failure.
        stdout: String,
    },
    /// The script did not finish within its wall-clock budget.
    Timeout {
        /// Standard output captured before the deadline fired.
        stdout: String,
    },
    /// The isolation tooling itself could not start or was misconfigured.
    ///
    /// Distinct from a script-caused failure: this indicates an environment
    /// problem and is logged with its full diagnostic, which is never
    /// surfaced to the caller.
    SandboxFailure {
        /// Operator-facing detail (log only).
        diagnostic: String,
    },
}

impl ExecutionOutcome {
    /// `true` for [`ExecutionOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Captured stdout, when this outcome carries any.
    #[must_use]
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::Success { stdout, .. }
            | Self::RuntimeError { stdout, .. }
            | Self::Timeout { stdout } => Some(stdout),
            Self::SandboxFailure { .. } => None,
        }
    }

    /// Short variant name for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::RuntimeError { .. } => "runtime_error",
            Self::Timeout { .. } => "timeout",
            Self::SandboxFailure { .. } => "sandbox_failure",
        }
    }
}
