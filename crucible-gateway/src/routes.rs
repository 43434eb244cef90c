//! Axum route handlers for the crucible gateway API.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crucible_core::{BackendKind, ExecutionOutcome, ExecutionRequest, Script};
use crucible_engine::{normalize, EngineOutcome, ScriptEngine};

use crate::error::GatewayError;

// ── Shared state ─────────────────────────────────────────────────────────────

type Engine = Arc<ScriptEngine>;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecuteBody {
    /// The script source. Required.
    pub script: String,
    /// Optional wall-clock override in seconds; clamped to the ceiling.
    pub timeout_secs: Option<u64>,
    /// Optional memory-ceiling override in MiB; clamped to the ceiling.
    pub memory_mib: Option<u32>,
    /// Optional backend hint (`"isolated"` or `"restricted"`).
    pub backend: Option<BackendKind>,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router with the given engine.
pub fn create_router(engine: Engine) -> Router {
    Router::new()
        .route("/execute", post(execute_script))
        .route("/health", get(health))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe, reporting which backend the one-time
/// capability probe selected.
pub async fn health(State(engine): State<Engine>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "crucible-gateway",
            "backend": engine.capability().to_string(),
        })),
    )
}

/// `POST /execute` — validate and run a script, returning the canonical
/// `{result, stdout, error}` shape.
///
/// Status mapping: 200 on success; 400 when the script was rejected, raised,
/// or timed out; 503 when the sandbox itself could not start.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] for out-of-range overrides.
pub async fn execute_script(
    State(engine): State<Engine>,
    Json(body): Json<ExecuteBody>,
) -> Result<impl IntoResponse, GatewayError> {
    if body.timeout_secs == Some(0) {
        return Err(GatewayError::InvalidRequest(
            "timeout_secs must be at least 1".to_owned(),
        ));
    }
    if body.memory_mib == Some(0) {
        return Err(GatewayError::InvalidRequest(
            "memory_mib must be at least 1".to_owned(),
        ));
    }

    let mut request = ExecutionRequest::new(Script::new(body.script));
    if let Some(secs) = body.timeout_secs {
        request = request.with_timeout(Duration::from_secs(secs));
    }
    if let Some(mib) = body.memory_mib {
        request = request.with_memory_limit_mib(mib);
    }
    if let Some(hint) = body.backend {
        request = request.with_backend_hint(hint);
    }

    let effective_timeout = engine.config().effective_limits(&request).timeout;
    let outcome = engine.dispatch(request).await;
    let status = status_for(&outcome);

    Ok((status, Json(normalize(&outcome, effective_timeout))))
}

fn status_for(outcome: &EngineOutcome) -> StatusCode {
    match outcome {
        EngineOutcome::Rejected(_) => StatusCode::BAD_REQUEST,
        EngineOutcome::Executed(ExecutionOutcome::Success { .. }) => StatusCode::OK,
        EngineOutcome::Executed(
            ExecutionOutcome::RuntimeError { .. } | ExecutionOutcome::Timeout { .. },
        ) => StatusCode::BAD_REQUEST,
        EngineOutcome::Executed(ExecutionOutcome::SandboxFailure { .. }) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        EngineOutcome::Executed(_) => unreachable!("unhandled ExecutionOutcome variant"),
    }
}
