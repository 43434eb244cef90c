//! OS-level isolation backend.
//!
//! Executes validated scripts in a separate process launched under nsjail:
//! fresh namespaces (including an empty network namespace), a read-only
//! filesystem view with one writable scratch mount, and rlimit ceilings for
//! address space, CPU time, file size, and process count. Configuration is a
//! per-execution generated policy file; the process is never reused, so no
//! state can travel between requests.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crucible_core::{BackendKind, ExecutionOutcome, ResourceLimits, SandboxConfig, Script};

use crate::backend::ExecutionBackend;
use crate::bootstrap::{
    parse_result_channel, ResultChannel, BOOTSTRAP_FILE, BOOTSTRAP_SOURCE, POLICY_FILE,
    SANDBOX_MOUNT, SCRIPT_FILE,
};
use crate::output::truncate_lossy;
use crate::policy::render_policy;
use crate::EngineError;

/// Execution in a separate nsjail-confined process.
#[derive(Debug, Clone)]
pub struct IsolatedBackend {
    config: Arc<SandboxConfig>,
}

impl IsolatedBackend {
    /// Create a backend sharing the process-wide configuration.
    #[must_use]
    pub fn new(config: Arc<SandboxConfig>) -> Self {
        Self { config }
    }

    /// Write the script, bootstrap wrapper, and generated policy into a
    /// fresh scratch directory, readable by the jail's unprivileged uid.
    async fn prepare_scratch(
        &self,
        script: &Script,
        limits: &ResourceLimits,
    ) -> Result<tempfile::TempDir, std::io::Error> {
        tokio::fs::create_dir_all(&self.config.scratch_root).await?;
        let scratch = tempfile::Builder::new()
            .prefix("crucible-")
            .tempdir_in(&self.config.scratch_root)?;

        let dir = scratch.path();
        tokio::fs::write(dir.join(SCRIPT_FILE), script.source()).await?;
        tokio::fs::write(dir.join(BOOTSTRAP_FILE), BOOTSTRAP_SOURCE).await?;
        tokio::fs::write(dir.join(POLICY_FILE), render_policy(limits, dir)).await?;

        set_mode(&dir.join(SCRIPT_FILE), 0o644).await?;
        set_mode(&dir.join(BOOTSTRAP_FILE), 0o644).await?;
        set_mode(&dir.join(POLICY_FILE), 0o644).await?;
        set_mode(dir, 0o755).await?;

        Ok(scratch)
    }
}

#[async_trait]
impl ExecutionBackend for IsolatedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Isolated
    }

    async fn execute(&self, script: &Script, limits: ResourceLimits) -> ExecutionOutcome {
        let scratch = match self.prepare_scratch(script, &limits).await {
            Ok(s) => s,
            Err(e) => {
                return ExecutionOutcome::SandboxFailure {
                    diagnostic: format!("failed to prepare scratch directory: {e}"),
                }
            }
        };

        let policy_path = scratch.path().join(POLICY_FILE);
        let bootstrap_in_jail = format!("{SANDBOX_MOUNT}/{BOOTSTRAP_FILE}");

        let mut command = Command::new(&self.config.nsjail_path);
        command
            .arg("--config")
            .arg(&policy_path)
            .arg("--")
            .arg(&self.config.python_path)
            .arg(&bootstrap_in_jail)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(c) => c,
            Err(e) => {
                return ExecutionOutcome::SandboxFailure {
                    diagnostic: format!(
                        "failed to launch {}: {e}",
                        self.config.nsjail_path.display()
                    ),
                }
            }
        };

        let pid = child.id();

        let Some(stdout_pipe) = child.stdout.take() else {
            return ExecutionOutcome::SandboxFailure {
                diagnostic: "child stdout was not piped".to_owned(),
            };
        };
        let Some(stderr_pipe) = child.stderr.take() else {
            return ExecutionOutcome::SandboxFailure {
                diagnostic: "child stderr was not piped".to_owned(),
            };
        };

        let cap = limits.max_output_bytes;
        let stdout_task = tokio::spawn(drain_capped(stdout_pipe, cap));
        let stderr_task = tokio::spawn(drain_capped(stderr_pipe, cap));

        let status = match tokio::time::timeout(limits.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                kill_process_group(pid);
                return ExecutionOutcome::SandboxFailure {
                    diagnostic: format!("failed to await sandboxed child: {e}"),
                };
            }
            Err(_elapsed) => {
                // Kill the entire process group, not just the jail leader, so
                // no descendant keeps running past the deadline.
                kill_process_group(pid);
                let _ = child.kill().await;
                let _ = child.wait().await;
                let stdout = stdout_task.await.unwrap_or_default();
                tracing::info!(
                    timeout_secs = limits.timeout.as_secs(),
                    "sandboxed execution exceeded its deadline"
                );
                return ExecutionOutcome::Timeout {
                    stdout: truncate_lossy(&stdout, cap),
                };
            }
        };

        let stdout_raw = stdout_task.await.unwrap_or_default();
        let stderr_raw = stderr_task.await.unwrap_or_default();
        let stdout = truncate_lossy(&stdout_raw, cap);
        let stderr = truncate_lossy(&stderr_raw, cap);

        map_exit(status, &stdout, &stderr)
    }

    async fn probe(&self) -> Result<(), EngineError> {
        which_binary(&self.config.nsjail_path)?;
        which_binary(&self.config.python_path)?;

        // Dry-run a trivial jailed command: binary presence alone does not
        // prove the host grants the namespace privileges nsjail needs.
        let output = Command::new(&self.config.nsjail_path)
            .args([
                "--mode",
                "o",
                "--time_limit",
                "5",
                "--disable_proc",
                "--iface_no_lo",
                "--really_quiet",
                "--",
                "/bin/true",
            ])
            .stdin(Stdio::null())
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(EngineError::IsolationUnavailable {
                reason: format!(
                    "probe run exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }
}

/// Map the child's exit status plus its streams onto an outcome.
fn map_exit(
    status: std::process::ExitStatus,
    stdout: &str,
    stderr: &str,
) -> ExecutionOutcome {
    let channel = parse_result_channel(stderr);

    if status.success() {
        match channel {
            ResultChannel::Value(value) => ExecutionOutcome::Success {
                value,
                stdout: stdout.to_owned(),
            },
            ResultChannel::Error(message) => ExecutionOutcome::RuntimeError {
                message,
                stdout: stdout.to_owned(),
            },
            ResultChannel::Absent => ExecutionOutcome::RuntimeError {
                message: "script execution produced no result".to_owned(),
                stdout: stdout.to_owned(),
            },
        }
    } else {
        let message = match channel {
            ResultChannel::Error(message) => message,
            _ => match status.code() {
                Some(code) => format!("script execution failed with exit code {code}"),
                None => "script execution was terminated by a signal".to_owned(),
            },
        };
        ExecutionOutcome::RuntimeError {
            message,
            stdout: stdout.to_owned(),
        }
    }
}

/// SIGKILL the child's whole process group.
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        #[allow(clippy::cast_possible_wrap)]
        let pgid = -(pid as i32);
        // The child was spawned with process_group(0), so its pid is the pgid.
        unsafe {
            let _ = libc::kill(pgid, libc::SIGKILL);
        }
    }
}

/// Read a stream to completion, keeping at most `cap` bytes but continuing
/// to drain so the child never blocks on a full pipe.
async fn drain_capped<R: tokio::io::AsyncRead + Unpin>(mut reader: R, cap: usize) -> Vec<u8> {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = cap.saturating_sub(kept.len());
                let take = room.min(n);
                kept.extend_from_slice(&chunk[..take]);
            }
        }
    }
    kept
}

/// Verify a binary exists either at the given path or in PATH.
fn which_binary(path: &Path) -> Result<(), EngineError> {
    if path.is_absolute() {
        if path.exists() {
            return Ok(());
        }
        return Err(EngineError::BinaryNotFound { path: path.to_owned() });
    }

    let found = std::env::var("PATH")
        .unwrap_or_default()
        .split(':')
        .map(|dir| Path::new(dir).join(path))
        .any(|p| p.exists());

    if found {
        Ok(())
    } else {
        Err(EngineError::BinaryNotFound { path: path.to_owned() })
    }
}

/// Chmod helper; the jail's unprivileged uid must be able to read the files.
async fn set_mode(path: &Path, mode: u32) -> Result<(), std::io::Error> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}
