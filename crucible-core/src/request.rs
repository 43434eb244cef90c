//! Execution requests and backend selection types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::script::Script;

/// Which execution path runs a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum BackendKind {
    /// Separate OS process under the external namespace sandbox.
    Isolated,
    /// In-process restricted interpreter.
    Restricted,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isolated => write!(f, "isolated"),
            Self::Restricted => write!(f, "restricted"),
        }
    }
}

/// One execution attempt: a script plus optional per-request overrides.
///
/// Constructed by the API layer, owned exclusively by one execution attempt,
/// immutable once built. Overrides are clamped to the configured ceilings by
/// [`SandboxConfig::effective_limits`](crate::SandboxConfig::effective_limits)
/// and can never widen them.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ExecutionRequest {
    /// The submitted source.
    pub script: Script,
    /// Per-request wall-clock budget, clamped to the configured ceiling.
    pub timeout: Option<Duration>,
    /// Per-request memory ceiling in MiB, clamped to the configured ceiling.
    pub memory_limit_mib: Option<u32>,
    /// Advisory backend selection; may only narrow isolation, never widen it.
    pub backend_hint: Option<BackendKind>,
}

impl ExecutionRequest {
    /// Create a request with no overrides.
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self {
            script,
            timeout: None,
            memory_limit_mib: None,
            backend_hint: None,
        }
    }

    /// Request a shorter wall-clock budget for this execution.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Request a smaller memory ceiling for this execution.
    #[must_use]
    pub fn with_memory_limit_mib(mut self, mib: u32) -> Self {
        self.memory_limit_mib = Some(mib);
        self
    }

    /// Hint which backend should run this script.
    #[must_use]
    pub fn with_backend_hint(mut self, hint: BackendKind) -> Self {
        self.backend_hint = Some(hint);
        self
    }
}
