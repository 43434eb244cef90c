//! Static validation verdicts.

use serde::{Deserialize, Serialize};

/// Outcome of static script checking.
///
/// Produced by the validator, consumed by the dispatcher; never mutated.
/// A `Rejected` verdict short-circuits the request before any backend runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ValidationVerdict {
    /// The script satisfies the execution contract.
    Accepted,
    /// The script violates the contract; nothing was executed.
    Rejected(RejectReason),
}

impl ValidationVerdict {
    /// `true` for [`ValidationVerdict::Accepted`].
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Closed taxonomy of validation failures.
///
/// Every rejection a caller can observe is one of these variants; the
/// validator never surfaces parser internals beyond the syntax message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[non_exhaustive]
pub enum RejectReason {
    /// The submitted source was empty or whitespace-only.
    #[error("script cannot be empty")]
    EmptyScript,

    /// The submitted source exceeded the configured size cap.
    #[error("script too large (max {limit} bytes)")]
    ScriptTooLarge { limit: usize },

    /// The source failed to parse.
    #[error("syntax error at line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    /// No top-level `main` definition was found.
    #[error("script must define a main() function")]
    MissingEntryPoint,

    /// A `main` definition exists but is not a plain zero-parameter function.
    #[error("invalid main() entry point: {detail}")]
    InvalidEntryPoint { detail: String },

    /// An import of a module outside the safe allowlist.
    #[error("import of module '{module}' is not permitted")]
    DisallowedImport { module: String },

    /// A reference to a forbidden builtin or dynamic-execution name.
    #[error("use of '{name}' is not permitted")]
    DisallowedName { name: String },

    /// A dunder attribute access.
    #[error("access to attribute '{attribute}' is not permitted")]
    DisallowedAttribute { attribute: String },
}
