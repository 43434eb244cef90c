//! Capability probe and request dispatch.
//!
//! The probe runs once at engine construction: whether the host permits the
//! namespace operations nsjail needs is a property of the deployment
//! environment, not of any request, so the verdict is cached for the process
//! lifetime and injected into the dispatcher.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crucible_core::{
    BackendKind, ExecutionId, ExecutionOutcome, ExecutionRequest, RejectReason, SandboxConfig,
    ValidationVerdict,
};

use crate::backend::ExecutionBackend;
use crate::isolated::IsolatedBackend;
use crate::restricted::RestrictedBackend;
use crate::validator::validate;

/// The strongest isolation the host supports, probed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// nsjail is present and the host grants the required privileges.
    Isolated,
    /// Namespace isolation is unavailable; the in-process backend is used.
    Restricted,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isolated => write!(f, "isolated"),
            Self::Restricted => write!(f, "restricted"),
        }
    }
}

/// Terminal result of dispatching one request.
#[derive(Debug, Clone)]
pub enum EngineOutcome {
    /// Validation rejected the script; no backend was invoked.
    Rejected(RejectReason),
    /// A backend produced the request's single [`ExecutionOutcome`].
    Executed(ExecutionOutcome),
}

/// The engine: validator, cached capability, and both backends.
///
/// Shared read-only across workers. Each `dispatch` call blocks its caller
/// until the request's single outcome exists; partial stdout is only ever
/// surfaced as part of that terminal outcome.
pub struct ScriptEngine {
    config: Arc<SandboxConfig>,
    capability: Capability,
    isolated: Box<dyn ExecutionBackend>,
    restricted: Box<dyn ExecutionBackend>,
}

impl ScriptEngine {
    /// Build the engine, probing the host's isolation capability once.
    ///
    /// Falls back to the restricted backend with a distinct warning when the
    /// probe fails — that backend has no CPU or memory ceiling, only the
    /// wall-clock deadline.
    pub async fn new(config: Arc<SandboxConfig>) -> Self {
        let isolated = IsolatedBackend::new(Arc::clone(&config));
        let restricted = RestrictedBackend::new(Arc::clone(&config));

        let capability = match isolated.probe().await {
            Ok(()) => {
                tracing::info!(
                    nsjail = %config.nsjail_path.display(),
                    "isolation probe succeeded; executing under nsjail"
                );
                Capability::Isolated
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "namespace isolation unavailable; falling back to the \
                     in-process restricted backend (wall-clock deadline only)"
                );
                Capability::Restricted
            }
        };

        Self::with_backends(config, capability, Box::new(isolated), Box::new(restricted))
    }

    /// Assemble an engine from explicit parts. Lets tests inject mock
    /// backends and a fixed capability instead of probing the host.
    #[must_use]
    pub fn with_backends(
        config: Arc<SandboxConfig>,
        capability: Capability,
        isolated: Box<dyn ExecutionBackend>,
        restricted: Box<dyn ExecutionBackend>,
    ) -> Self {
        Self { config, capability, isolated, restricted }
    }

    /// The capability cached at construction.
    #[must_use]
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// The shared configuration.
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Validate and execute one request, producing its single outcome.
    ///
    /// A `Rejected` verdict short-circuits without invoking any backend.
    pub async fn dispatch(&self, request: ExecutionRequest) -> EngineOutcome {
        let execution = ExecutionId::new();
        tracing::info!(
            %execution,
            script_sha256 = %request.script.digest(),
            script_bytes = request.script.len(),
            "received execution request"
        );

        match validate(&request.script, &self.config) {
            ValidationVerdict::Rejected(reason) => {
                tracing::info!(%execution, %reason, "script rejected by validation");
                return EngineOutcome::Rejected(reason);
            }
            ValidationVerdict::Accepted => {}
            _ => unreachable!("unhandled ValidationVerdict variant"),
        }

        let backend = self.select_backend(request.backend_hint);
        let limits = self.config.effective_limits(&request);
        let started = Instant::now();

        let outcome = backend.execute(&request.script, limits).await;

        match &outcome {
            ExecutionOutcome::SandboxFailure { diagnostic } => {
                // Environment misconfiguration, not a bad script; the
                // diagnostic stays in the log.
                tracing::error!(%execution, %diagnostic, "sandbox failed to start");
            }
            other => {
                tracing::info!(
                    %execution,
                    backend = %backend.kind(),
                    outcome = other.kind(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "execution finished"
                );
            }
        }

        EngineOutcome::Executed(outcome)
    }

    /// Route per the cached capability. A hint may only narrow isolation:
    /// `restricted` downgrades a request on an isolated host, while
    /// `isolated` on a restricted host is ignored.
    fn select_backend(&self, hint: Option<BackendKind>) -> &dyn ExecutionBackend {
        match (self.capability, hint) {
            (Capability::Isolated, Some(BackendKind::Restricted)) => {
                tracing::debug!("request hinted the restricted backend; downgrading");
                self.restricted.as_ref()
            }
            (Capability::Isolated, _) => self.isolated.as_ref(),
            (Capability::Restricted, hint) => {
                if hint == Some(BackendKind::Isolated) {
                    tracing::debug!("isolated hint ignored: host lacks the capability");
                }
                self.restricted.as_ref()
            }
        }
    }
}
