//! Errors produced by the `crucible-core` crate.

/// Errors produced by the `crucible-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A configuration field failed validation at startup.
    #[error("invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },
}
