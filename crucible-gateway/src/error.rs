//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors that can occur during gateway request handling.
///
/// Script-caused failures are not errors here — they arrive as normal
/// engine outcomes and are mapped by the route handler. This type covers
/// malformed requests only.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request body is malformed or contains invalid values.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
