//! Result normalization.
//!
//! Collapses every dispatch outcome into the canonical response shape and
//! guarantees the caller never sees stack traces, absolute filesystem paths,
//! or sandbox-tool diagnostics — only the closed error taxonomy.

use std::time::Duration;

use crucible_core::{ExecutionOutcome, ExecutionResponse};

use crate::dispatch::EngineOutcome;

/// Fixed caller-facing message for sandbox launch failures. The diagnostic
/// behind it is logged by the dispatcher, never surfaced.
const SANDBOX_FAILURE_MESSAGE: &str =
    "execution environment unavailable; the request was not run";

/// Map an outcome onto the canonical `{result, stdout, error}` shape.
///
/// `timeout` is the effective wall-clock budget the request ran under, used
/// only to word the timeout message.
#[must_use]
pub fn normalize(outcome: &EngineOutcome, timeout: Duration) -> ExecutionResponse {
    match outcome {
        EngineOutcome::Rejected(reason) => {
            ExecutionResponse::failure(format!("validation failed: {reason}"), String::new())
        }
        EngineOutcome::Executed(ExecutionOutcome::Success { value, stdout }) => {
            ExecutionResponse::success(value.clone(), stdout.clone())
        }
        EngineOutcome::Executed(ExecutionOutcome::RuntimeError { message, stdout }) => {
            ExecutionResponse::failure(sanitize_message(message), stdout.clone())
        }
        EngineOutcome::Executed(ExecutionOutcome::Timeout { stdout }) => {
            ExecutionResponse::failure(
                format!(
                    "execution timed out: script exceeded the {} second limit",
                    timeout.as_secs()
                ),
                stdout.clone(),
            )
        }
        EngineOutcome::Executed(ExecutionOutcome::SandboxFailure { .. }) => {
            ExecutionResponse::failure(SANDBOX_FAILURE_MESSAGE.to_owned(), String::new())
        }
        EngineOutcome::Executed(_) => unreachable!("unhandled ExecutionOutcome variant"),
    }
}

/// Reduce a runtime message to one line with absolute paths scrubbed.
fn sanitize_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default();
    first_line
        .split_whitespace()
        .map(|token| {
            let stripped = token.trim_matches(|c: char| "'\"`([{,:;".contains(c));
            if stripped.starts_with('/') {
                "<path>"
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use crucible_core::RejectReason;

    use super::*;

    const FIVE_SECS: Duration = Duration::from_secs(5);

    #[test]
    fn rejection_normalizes_to_validation_failure() {
        let outcome = EngineOutcome::Rejected(RejectReason::MissingEntryPoint);
        let response = normalize(&outcome, FIVE_SECS);
        assert_eq!(
            response.error.as_deref(),
            Some("validation failed: script must define a main() function")
        );
        assert_eq!(response.result, serde_json::Value::Null);
        assert_eq!(response.stdout, "");
    }

    #[test]
    fn success_keeps_value_and_stdout_without_error() {
        let outcome = EngineOutcome::Executed(ExecutionOutcome::Success {
            value: serde_json::json!({"ok": true}),
            stdout: "Hello\n".to_owned(),
        });
        let response = normalize(&outcome, FIVE_SECS);
        assert!(response.is_success());
        assert_eq!(response.result, serde_json::json!({"ok": true}));
        assert_eq!(response.stdout, "Hello\n");
    }

    #[test]
    fn runtime_error_keeps_partial_stdout() {
        let outcome = EngineOutcome::Executed(ExecutionOutcome::RuntimeError {
            message: "ZeroDivisionError: division by zero".to_owned(),
            stdout: "before the crash\n".to_owned(),
        });
        let response = normalize(&outcome, FIVE_SECS);
        assert_eq!(response.stdout, "before the crash\n");
        assert_eq!(
            response.error.as_deref(),
            Some("ZeroDivisionError: division by zero")
        );
    }

    #[test]
    fn timeout_message_is_distinct_and_names_the_limit() {
        let outcome = EngineOutcome::Executed(ExecutionOutcome::Timeout {
            stdout: "tick\n".to_owned(),
        });
        let response = normalize(&outcome, FIVE_SECS);
        let error = response.error.as_deref().unwrap_or_default();
        assert!(error.starts_with("execution timed out"), "got {error}");
        assert!(error.contains("5 second"), "got {error}");
        assert_eq!(response.stdout, "tick\n");
    }

    #[test]
    fn sandbox_failure_never_leaks_the_diagnostic() {
        let outcome = EngineOutcome::Executed(ExecutionOutcome::SandboxFailure {
            diagnostic: "nsjail not found at /usr/bin/nsjail".to_owned(),
        });
        let response = normalize(&outcome, FIVE_SECS);
        let error = response.error.as_deref().unwrap_or_default();
        assert!(!error.contains("nsjail"), "diagnostic leaked: {error}");
        assert!(!error.contains('/'), "path leaked: {error}");
    }

    #[test]
    fn sanitize_scrubs_absolute_paths() {
        let msg = "FileNotFoundError: [Errno 2] No such file or directory: '/etc/passwd'";
        let cleaned = sanitize_message(msg);
        assert!(!cleaned.contains("/etc/passwd"), "got {cleaned}");
        assert!(cleaned.contains("<path>"));
        assert!(cleaned.contains("FileNotFoundError"));
    }

    #[test]
    fn sanitize_keeps_single_line_of_multiline_message() {
        let msg = "ValueError: bad input\nTraceback (most recent call last):\n  File \"x\"";
        let cleaned = sanitize_message(msg);
        assert_eq!(cleaned, "ValueError: bad input");
    }

    #[test]
    fn sanitize_leaves_plain_messages_untouched() {
        assert_eq!(
            sanitize_message("ZeroDivisionError: division by zero"),
            "ZeroDivisionError: division by zero"
        );
    }
}
