//! JSON-serializability predicate.
//!
//! Returned values must be composed only of null, booleans, finite numbers,
//! strings, and arrays/objects of the same. `serde_json::Value` is already a
//! closed tagged variant over that domain; this predicate adds the checks the
//! type alone cannot express: finite numbers and a nesting depth bound.

/// Maximum nesting depth a returned value may have.
///
/// Values arriving from the result channel went through `serde_json`'s own
/// recursion limit already; this bound also covers values built directly by
/// the in-process backend.
const MAX_DEPTH: usize = 64;

/// A value that failed the JSON-serializability predicate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum JsonValueError {
    /// A number was NaN or infinite.
    #[error("return value contains a non-finite number")]
    NonFiniteNumber,

    /// The value nests deeper than [`MAX_DEPTH`].
    #[error("return value nests deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// Check that `value` stays within the JSON value domain.
///
/// # Errors
/// Returns [`JsonValueError`] when the value contains a non-finite number or
/// nests too deeply.
pub fn ensure_json_value(value: &serde_json::Value) -> Result<(), JsonValueError> {
    check(value, 0)
}

fn check(value: &serde_json::Value, depth: usize) -> Result<(), JsonValueError> {
    if depth > MAX_DEPTH {
        return Err(JsonValueError::TooDeep);
    }
    match value {
        serde_json::Value::Null
        | serde_json::Value::Bool(_)
        | serde_json::Value::String(_) => Ok(()),
        serde_json::Value::Number(n) => {
            // Integer numbers are always in-domain; floats must be finite.
            match n.as_f64() {
                Some(f) if !f.is_finite() => Err(JsonValueError::NonFiniteNumber),
                _ => Ok(()),
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                check(item, depth + 1)?;
            }
            Ok(())
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                check(item, depth + 1)?;
            }
            Ok(())
        }
    }
}
