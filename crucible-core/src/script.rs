//! Submitted script source and its log-safe digest.

use std::fmt;

use sha2::{Digest, Sha256};

/// Raw source text submitted by a caller.
///
/// Immutable once received: created per request and discarded after the
/// execution completes. The engine never retains script content; log lines
/// identify a script by its [`ScriptDigest`] and byte length only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    source: String,
}

impl Script {
    /// Wrap submitted source text.
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    /// The raw source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// `true` if the source is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// SHA-256 digest of the source, for log correlation.
    #[must_use]
    pub fn digest(&self) -> ScriptDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        ScriptDigest(hasher.finalize().into())
    }
}

impl From<String> for Script {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

/// SHA-256 digest of a script's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct ScriptDigest(pub [u8; 32]);

impl ScriptDigest {
    /// The raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ScriptDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
