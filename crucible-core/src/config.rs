//! Process-wide sandbox configuration.
//!
//! Loaded once at startup, validated, then shared read-only (`Arc`) by every
//! worker. There is no mutation API; per-request overrides are clamped to the
//! ceilings declared here and can never widen them.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::CoreError;
use crate::request::ExecutionRequest;

/// Static sandbox policy and resource ceilings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct SandboxConfig {
    /// Path to the nsjail binary (absolute, or a bare name looked up in PATH).
    pub nsjail_path: PathBuf,

    /// Path to the Python interpreter used inside the jail.
    pub python_path: PathBuf,

    /// Directory under which per-execution scratch directories are created.
    pub scratch_root: PathBuf,

    /// Wall-clock ceiling per execution, in seconds.
    pub timeout_secs: u64,

    /// CPU-time ceiling per isolated execution, in seconds.
    pub cpu_time_secs: u64,

    /// Address-space ceiling per isolated execution, in MiB.
    pub memory_limit_mib: u32,

    /// Maximum process count inside the jail (fork-bomb cap).
    pub max_processes: u32,

    /// Maximum accepted script size in bytes.
    pub max_script_bytes: usize,

    /// Captured stdout/stderr cap in bytes; output beyond it is truncated.
    pub max_output_bytes: usize,

    /// Modules submitted scripts may import.
    ///
    /// Covers only pure computational standard-library modules; filesystem,
    /// process, network, and introspection modules are never listed.
    pub import_allowlist: Vec<String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            nsjail_path: PathBuf::from("/usr/bin/nsjail"),
            python_path: PathBuf::from("/usr/local/bin/python3"),
            scratch_root: std::env::temp_dir(),
            timeout_secs: 5,
            cpu_time_secs: 5,
            memory_limit_mib: 512,
            max_processes: 4,
            max_script_bytes: 100 * 1024,
            max_output_bytes: 256 * 1024,
            import_allowlist: default_allowlist(),
        }
    }
}

/// The fixed safe-import allowlist: pure computational stdlib modules only.
fn default_allowlist() -> Vec<String> {
    [
        "base64",
        "bisect",
        "cmath",
        "collections",
        "copy",
        "dataclasses",
        "datetime",
        "decimal",
        "enum",
        "fractions",
        "functools",
        "hashlib",
        "heapq",
        "itertools",
        "json",
        "math",
        "random",
        "re",
        "statistics",
        "string",
        "textwrap",
        "time",
        "typing",
        "unicodedata",
    ]
    .iter()
    .map(|&s| s.to_owned())
    .collect()
}

impl SandboxConfig {
    /// Reject configurations that could disable the sandbox's guarantees.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig {
                field: "timeout_secs".to_owned(),
                reason: "must be at least 1 second".to_owned(),
            });
        }
        if self.cpu_time_secs == 0 {
            return Err(CoreError::InvalidConfig {
                field: "cpu_time_secs".to_owned(),
                reason: "must be at least 1 second".to_owned(),
            });
        }
        if self.memory_limit_mib < 16 {
            return Err(CoreError::InvalidConfig {
                field: "memory_limit_mib".to_owned(),
                reason: "must be at least 16 MiB".to_owned(),
            });
        }
        if self.max_processes == 0 {
            return Err(CoreError::InvalidConfig {
                field: "max_processes".to_owned(),
                reason: "must allow at least one process".to_owned(),
            });
        }
        if self.max_script_bytes == 0 || self.max_output_bytes == 0 {
            return Err(CoreError::InvalidConfig {
                field: "max_script_bytes/max_output_bytes".to_owned(),
                reason: "must be non-zero".to_owned(),
            });
        }
        Ok(())
    }

    /// The configured wall-clock ceiling as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `true` if `module` is on the safe-import allowlist.
    #[must_use]
    pub fn allows_import(&self, module: &str) -> bool {
        self.import_allowlist.iter().any(|m| m == module)
    }

    /// Resolve a request's overrides against the configured ceilings.
    ///
    /// Overrides may only narrow: a request asking for more time or memory
    /// than the ceiling gets the ceiling.
    #[must_use]
    pub fn effective_limits(&self, request: &ExecutionRequest) -> ResourceLimits {
        let ceiling = self.timeout();
        let timeout = request.timeout.map_or(ceiling, |t| t.min(ceiling));
        let memory_mib = request
            .memory_limit_mib
            .map_or(self.memory_limit_mib, |m| m.min(self.memory_limit_mib));
        ResourceLimits {
            timeout,
            memory_mib,
            cpu_secs: self.cpu_time_secs,
            max_processes: self.max_processes,
            max_output_bytes: self.max_output_bytes,
        }
    }
}

/// Effective per-execution limits after clamping request overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Wall-clock budget for this execution.
    pub timeout: Duration,
    /// Address-space ceiling in MiB (isolated backend only).
    pub memory_mib: u32,
    /// CPU-time ceiling in seconds (isolated backend only).
    pub cpu_secs: u64,
    /// Process-count cap inside the jail.
    pub max_processes: u32,
    /// Captured-output cap in bytes.
    pub max_output_bytes: usize,
}
