//! Integration tests for the in-process restricted backend.
//!
//! These run a real embedded interpreter and need no external sandbox
//! tooling, so they execute everywhere the crate builds.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crucible_core::{
    ExecutionOutcome, ExecutionRequest, ResourceLimits, SandboxConfig, Script,
};
use crucible_engine::{ExecutionBackend, RestrictedBackend};

fn backend() -> RestrictedBackend {
    RestrictedBackend::new(Arc::new(SandboxConfig::default()))
}

fn default_limits() -> ResourceLimits {
    let config = SandboxConfig::default();
    config.effective_limits(&ExecutionRequest::new(Script::new("")))
}

fn limits_with_timeout(timeout: Duration) -> ResourceLimits {
    let config = SandboxConfig::default();
    config.effective_limits(&ExecutionRequest::new(Script::new("")).with_timeout(timeout))
}

#[tokio::test]
async fn print_and_dict_return_yields_success_with_exact_streams() {
    let script = Script::new(
        "def main():\n    print(\"Hello from the sandbox\")\n    return {\"ok\": True}\n",
    );
    let outcome = backend().execute(&script, default_limits()).await;
    match outcome {
        ExecutionOutcome::Success { value, stdout } => {
            assert_eq!(value, serde_json::json!({"ok": true}));
            assert_eq!(stdout, "Hello from the sandbox\n");
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn scalar_and_list_returns_are_accepted() {
    let cases = [
        ("def main():\n    return 42\n", serde_json::json!(42)),
        ("def main():\n    return None\n", serde_json::json!(null)),
        ("def main():\n    return [1, \"two\", None]\n", serde_json::json!([1, "two", null])),
        (
            "def main():\n    return {\"nested\": {\"list\": [True, False]}}\n",
            serde_json::json!({"nested": {"list": [true, false]}}),
        ),
    ];
    for (source, expected) in cases {
        let outcome = backend().execute(&Script::new(source), default_limits()).await;
        match outcome {
            ExecutionOutcome::Success { value, .. } => assert_eq!(value, expected, "for {source}"),
            other => panic!("expected Success for {source}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn raised_exception_becomes_runtime_error_with_partial_stdout() {
    let script = Script::new(
        "def main():\n    print(\"before\")\n    return 1 // 0\n",
    );
    let outcome = backend().execute(&script, default_limits()).await;
    match outcome {
        ExecutionOutcome::RuntimeError { message, stdout } => {
            assert!(message.contains("ZeroDivisionError"), "got {message}");
            assert_eq!(stdout, "before\n");
        }
        other => panic!("expected RuntimeError, got {other:?}"),
    }
}

#[tokio::test]
async fn set_return_is_runtime_error_naming_the_type() {
    let script = Script::new("def main():\n    return {1, 2, 3}\n");
    let outcome = backend().execute(&script, default_limits()).await;
    match outcome {
        ExecutionOutcome::RuntimeError { message, .. } => {
            assert!(message.contains("set"), "message must name the type: {message}");
            assert!(message.contains("not JSON-serializable"), "got {message}");
        }
        other => panic!("expected RuntimeError, got {other:?}"),
    }
}

#[tokio::test]
async fn non_string_dict_key_is_runtime_error() {
    let script = Script::new("def main():\n    return {1: \"one\"}\n");
    let outcome = backend().execute(&script, default_limits()).await;
    match outcome {
        ExecutionOutcome::RuntimeError { message, .. } => {
            assert!(message.contains("keys must be strings"), "got {message}");
        }
        other => panic!("expected RuntimeError, got {other:?}"),
    }
}

#[tokio::test]
async fn function_return_value_is_runtime_error_never_success() {
    let script = Script::new("def main():\n    return main\n");
    let outcome = backend().execute(&script, default_limits()).await;
    assert!(
        matches!(outcome, ExecutionOutcome::RuntimeError { .. }),
        "got {outcome:?}"
    );
}

#[tokio::test]
async fn math_import_executes() {
    let script = Script::new("import math\n\ndef main():\n    return {\"floor\": math.floor(2.75)}\n");
    let outcome = backend().execute(&script, default_limits()).await;
    match outcome {
        ExecutionOutcome::Success { value, .. } => {
            assert_eq!(value, serde_json::json!({"floor": 2}));
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn disallowed_import_fails_at_runtime_too() {
    // Defense in depth: even though validation would reject this script, the
    // backend's own import hook must hold when called directly.
    let script = Script::new("import os\n\ndef main():\n    return {}\n");
    let outcome = backend().execute(&script, default_limits()).await;
    match outcome {
        ExecutionOutcome::RuntimeError { message, .. } => {
            assert!(message.contains("not permitted"), "got {message}");
        }
        other => panic!("expected RuntimeError, got {other:?}"),
    }
}

#[tokio::test]
async fn busy_loop_times_out_within_a_bounded_margin() {
    let script = Script::new("def main():\n    while True:\n        pass\n");
    let deadline = Duration::from_millis(400);
    let started = Instant::now();
    let outcome = backend().execute(&script, limits_with_timeout(deadline)).await;
    let elapsed = started.elapsed();

    assert!(matches!(outcome, ExecutionOutcome::Timeout { .. }), "got {outcome:?}");
    assert!(
        elapsed < deadline + Duration::from_secs(2),
        "timeout must fire near the deadline, took {elapsed:?}"
    );
}

#[tokio::test]
async fn timeout_preserves_stdout_written_before_the_deadline() {
    let script = Script::new(
        "def main():\n    print(\"made it this far\")\n    while True:\n        pass\n",
    );
    let outcome = backend()
        .execute(&script, limits_with_timeout(Duration::from_millis(400)))
        .await;
    match outcome {
        ExecutionOutcome::Timeout { stdout } => {
            assert_eq!(stdout, "made it this far\n");
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn backend_is_usable_immediately_after_a_timeout() {
    let b = backend();
    let loop_script = Script::new("def main():\n    while True:\n        pass\n");
    let outcome = b
        .execute(&loop_script, limits_with_timeout(Duration::from_millis(300)))
        .await;
    assert!(matches!(outcome, ExecutionOutcome::Timeout { .. }));

    let script = Script::new("def main():\n    return {\"alive\": True}\n");
    let outcome = b.execute(&script, default_limits()).await;
    match outcome {
        ExecutionOutcome::Success { value, .. } => {
            assert_eq!(value, serde_json::json!({"alive": true}));
        }
        other => panic!("expected Success after timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn identical_scripts_yield_identical_outcomes() {
    let b = backend();
    let source = "def main():\n    print(\"same\")\n    return {\"n\": 7}\n";

    let first = b.execute(&Script::new(source), default_limits()).await;
    let second = b.execute(&Script::new(source), default_limits()).await;

    match (first, second) {
        (
            ExecutionOutcome::Success { value: v1, stdout: s1 },
            ExecutionOutcome::Success { value: v2, stdout: s2 },
        ) => {
            assert_eq!(v1, v2);
            assert_eq!(s1, s2);
        }
        other => panic!("expected two Successes, got {other:?}"),
    }
}

#[tokio::test]
async fn state_never_leaks_between_requests() {
    let b = backend();

    // First script defines a module-level name.
    let define = Script::new("LEAK = \"secret\"\n\ndef main():\n    return {\"set\": True}\n");
    let outcome = b.execute(&define, default_limits()).await;
    assert!(outcome.is_success(), "got {outcome:?}");

    // Second script must not see it: fresh interpreter, fresh namespace.
    let probe = Script::new(
        "def main():\n    try:\n        return {\"leaked\": LEAK}\n    except NameError:\n        return {\"leaked\": None}\n",
    );
    let outcome = b.execute(&probe, default_limits()).await;
    match outcome {
        ExecutionOutcome::Success { value, .. } => {
            assert_eq!(value, serde_json::json!({"leaked": null}));
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn stdout_is_capped_not_unbounded() {
    let script = Script::new(
        "def main():\n    for _ in range(200000):\n        print(\"xxxxxxxxxxxxxxxx\")\n    return {}\n",
    );
    let outcome = backend().execute(&script, default_limits()).await;
    let stdout = outcome.stdout().unwrap_or_default().to_owned();
    let cap = SandboxConfig::default().max_output_bytes;
    assert!(
        stdout.len() <= cap + 64,
        "stdout must be bounded near the cap, got {} bytes",
        stdout.len()
    );
    assert!(stdout.contains("[output truncated]"));
}
