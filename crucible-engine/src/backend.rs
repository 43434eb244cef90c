//! Execution backend abstraction trait.
//!
//! Allows swapping between OS-level isolation and the in-process restricted
//! interpreter without changing the dispatch logic.

use async_trait::async_trait;

use crucible_core::{BackendKind, ExecutionOutcome, ResourceLimits, Script};

use crate::EngineError;

/// An execution path for validated scripts.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Outcome totality
/// `execute` is total over [`ExecutionOutcome`]: a backend that fails to
/// launch reports [`ExecutionOutcome::SandboxFailure`] rather than returning
/// an error, so exactly one outcome exists per request and nothing propagates
/// past the dispatcher.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Which execution path this backend provides.
    fn kind(&self) -> BackendKind;

    /// Run a validated script under the given limits until it terminates,
    /// fails, or exceeds its wall-clock budget.
    ///
    /// The script must already have passed
    /// [`validate`](crate::validator::validate); backends re-enforce the
    /// contract at runtime but report violations as
    /// [`ExecutionOutcome::RuntimeError`], not as rejections.
    async fn execute(&self, script: &Script, limits: ResourceLimits) -> ExecutionOutcome;

    /// Check whether this backend can run on the current host.
    ///
    /// # Errors
    /// Returns [`EngineError::BinaryNotFound`] or
    /// [`EngineError::IsolationUnavailable`] when the environment is not
    /// ready.
    async fn probe(&self) -> Result<(), EngineError>;
}
