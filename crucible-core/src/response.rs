//! Canonical external response shape.

use serde::{Deserialize, Serialize};

/// The single response shape every execution collapses into.
///
/// ```json
/// { "result": <JSON value> | null,
///   "stdout": "<string, possibly empty>",
///   "error":  "<string>" }            // present only on failure
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ExecutionResponse {
    /// The entry point's return value; `null` on any failure.
    pub result: serde_json::Value,
    /// Captured standard output, possibly empty.
    pub stdout: String,
    /// Sanitized failure description; omitted on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResponse {
    /// A successful response.
    #[must_use]
    pub fn success(result: serde_json::Value, stdout: String) -> Self {
        Self { result, stdout, error: None }
    }

    /// A failed response. `result` is always `null`.
    #[must_use]
    pub fn failure(error: String, stdout: String) -> Self {
        Self { result: serde_json::Value::Null, stdout, error: Some(error) }
    }

    /// `true` when no error is present.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
