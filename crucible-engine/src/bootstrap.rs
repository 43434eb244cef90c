//! Generated bootstrap wrapper for isolated execution, and the parser for
//! its result channel.
//!
//! The wrapper runs as the jailed process. It loads the script from the
//! scratch mount, executes it in an isolated namespace, calls the entry
//! point, enforces JSON-serializability, and writes the encoded result to
//! **stderr** between start/end markers. stderr is the structured result
//! channel precisely so the script's own `print` output on stdout can never
//! corrupt the payload.

use crucible_core::ensure_json_value;

/// Marker opening the result block on the child's stderr.
pub const RESULT_START_MARKER: &str = "<<<RESULT_START>>>";
/// Marker closing the result block on the child's stderr.
pub const RESULT_END_MARKER: &str = "<<<RESULT_END>>>";

/// Mount point of the writable scratch directory inside the jail.
pub const SANDBOX_MOUNT: &str = "/sandbox";
/// Script file name inside the scratch directory.
pub const SCRIPT_FILE: &str = "script.py";
/// Bootstrap file name inside the scratch directory.
pub const BOOTSTRAP_FILE: &str = "bootstrap.py";
/// Generated policy file name inside the scratch directory.
pub const POLICY_FILE: &str = "policy.cfg";

/// The wrapper source. Static: the in-jail paths are fixed by the policy's
/// mount table, so nothing is interpolated from untrusted input.
pub const BOOTSTRAP_SOURCE: &str = r#"#!/usr/bin/env python3
import json
import sys
import traceback

SCRIPT_PATH = "/sandbox/script.py"
RESULT_START = "<<<RESULT_START>>>"
RESULT_END = "<<<RESULT_END>>>"


def run():
    try:
        with open(SCRIPT_PATH, "r", encoding="utf-8") as f:
            source = f.read()
    except OSError as e:
        print("ERROR: unable to read script: %s" % e, file=sys.stderr)
        return False

    namespace = {
        "__name__": "__main__",
        "__builtins__": __builtins__,
    }

    try:
        exec(compile(source, "script.py", "exec"), namespace)
    except BaseException as e:
        print("ERROR: %s: %s" % (type(e).__name__, e), file=sys.stderr)
        traceback.print_exc(file=sys.stderr)
        return False

    entry = namespace.get("main")
    if entry is None:
        print("ERROR: script must define a main() function", file=sys.stderr)
        return False
    if not callable(entry):
        print("ERROR: main must be a function, not a variable", file=sys.stderr)
        return False

    try:
        result = entry()
    except BaseException as e:
        print("ERROR: %s: %s" % (type(e).__name__, e), file=sys.stderr)
        traceback.print_exc(file=sys.stderr)
        return False

    try:
        payload = json.dumps(result, allow_nan=False)
    except (TypeError, ValueError):
        print(
            "ERROR: return value of type '%s' is not JSON-serializable"
            % type(result).__name__,
            file=sys.stderr,
        )
        return False

    print(RESULT_START, file=sys.stderr)
    print(payload, file=sys.stderr)
    print(RESULT_END, file=sys.stderr)
    return True


if __name__ == "__main__":
    sys.exit(0 if run() else 1)
"#;

/// What the child's stderr said about the execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultChannel {
    /// A well-formed, predicate-passing result block.
    Value(serde_json::Value),
    /// An `ERROR:` line from the wrapper (already caller-safe wording).
    Error(String),
    /// Neither a result block nor an error line was found.
    Absent,
}

/// Extract the structured result from the child's stderr stream.
///
/// A marker block wins over error lines; a malformed block degrades to
/// [`ResultChannel::Error`] rather than panicking or surfacing raw stderr.
#[must_use]
pub fn parse_result_channel(stderr: &str) -> ResultChannel {
    if let Some(block) = extract_marker_block(stderr) {
        return match serde_json::from_str::<serde_json::Value>(block.trim()) {
            Ok(value) => match ensure_json_value(&value) {
                Ok(()) => ResultChannel::Value(value),
                Err(e) => ResultChannel::Error(e.to_string()),
            },
            Err(_) => ResultChannel::Error("execution produced a malformed result".to_owned()),
        };
    }

    for line in stderr.lines() {
        if let Some(message) = line.trim_start().strip_prefix("ERROR:") {
            return ResultChannel::Error(message.trim().to_owned());
        }
    }

    ResultChannel::Absent
}

fn extract_marker_block(stderr: &str) -> Option<&str> {
    let start = stderr.find(RESULT_START_MARKER)? + RESULT_START_MARKER.len();
    let end = stderr[start..].find(RESULT_END_MARKER)? + start;
    Some(&stderr[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_block_parses_to_value() {
        let stderr = format!("{RESULT_START_MARKER}\n{{\"ok\": true}}\n{RESULT_END_MARKER}\n");
        assert_eq!(
            parse_result_channel(&stderr),
            ResultChannel::Value(serde_json::json!({"ok": true}))
        );
    }

    #[test]
    fn block_wins_over_earlier_noise() {
        let stderr = format!(
            "some warning\n{RESULT_START_MARKER}\n[1, 2, 3]\n{RESULT_END_MARKER}\ntrailing"
        );
        assert_eq!(
            parse_result_channel(&stderr),
            ResultChannel::Value(serde_json::json!([1, 2, 3]))
        );
    }

    #[test]
    fn malformed_block_degrades_to_error() {
        let stderr = format!("{RESULT_START_MARKER}\nnot json at all\n{RESULT_END_MARKER}\n");
        assert!(matches!(parse_result_channel(&stderr), ResultChannel::Error(_)));
    }

    #[test]
    fn error_line_is_extracted_without_prefix() {
        let stderr = "ERROR: NameError: name 'x' is not defined\nTraceback (most recent call last):\n";
        assert_eq!(
            parse_result_channel(stderr),
            ResultChannel::Error("NameError: name 'x' is not defined".to_owned())
        );
    }

    #[test]
    fn missing_end_marker_falls_back_to_error_scan() {
        let stderr = format!("{RESULT_START_MARKER}\n{{}}");
        assert_eq!(parse_result_channel(&stderr), ResultChannel::Absent);
    }

    #[test]
    fn empty_stderr_is_absent() {
        assert_eq!(parse_result_channel(""), ResultChannel::Absent);
    }

    #[test]
    fn bootstrap_source_mentions_fixed_paths_and_markers() {
        assert!(BOOTSTRAP_SOURCE.contains(SANDBOX_MOUNT));
        assert!(BOOTSTRAP_SOURCE.contains(RESULT_START_MARKER));
        assert!(BOOTSTRAP_SOURCE.contains(RESULT_END_MARKER));
        assert!(BOOTSTRAP_SOURCE.contains("allow_nan=False"));
    }

    proptest::proptest! {
        #[test]
        fn proptest_parse_never_panics(stderr in "\\PC{0,512}") {
            let _ = parse_result_channel(&stderr);
        }

        #[test]
        fn proptest_roundtrip_json_objects(key in "[a-z]{1,8}", n in -1000i64..1000) {
            let stderr = format!(
                "{RESULT_START_MARKER}\n{{\"{key}\": {n}}}\n{RESULT_END_MARKER}\n"
            );
            let parsed = parse_result_channel(&stderr);
            proptest::prop_assert_eq!(
                parsed,
                ResultChannel::Value(serde_json::json!({ key.as_str(): n }))
            );
        }
    }
}
