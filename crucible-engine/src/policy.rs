//! Generated nsjail policy files.
//!
//! Each isolated execution gets its own policy file (nsjail's protobuf text
//! format) rendered from the immutable [`SandboxConfig`] plus the request's
//! clamped [`ResourceLimits`]. The policy declares the filesystem view (a
//! read-only system mount table plus the single writable scratch mount),
//! fresh namespaces including an empty network namespace, and the resource
//! ceilings. Per-request values can only narrow what the config declares —
//! the clamping happened before this module is reached.

use std::path::Path;

use crucible_core::ResourceLimits;

use crate::bootstrap::SANDBOX_MOUNT;

/// Read-only host paths a Python runtime may need. Missing ones are marked
/// non-mandatory so the same policy works across distributions.
const SYSTEM_MOUNTS: &[(&str, bool)] = &[
    ("/usr", true),
    ("/lib", false),
    ("/lib64", false),
    ("/bin", false),
    ("/etc/alternatives", false),
];

/// Render the policy file for one execution.
///
/// `scratch` is the host path of the per-execution scratch directory; it is
/// the only writable mount inside the jail.
#[must_use]
pub fn render_policy(limits: &ResourceLimits, scratch: &Path) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str("name: \"crucible\"\n");
    out.push_str("description: \"generated per-execution sandbox policy\"\n\n");
    out.push_str("mode: ONCE\n");
    out.push_str("hostname: \"crucible\"\n");
    out.push_str(&format!("cwd: \"{SANDBOX_MOUNT}\"\n\n"));

    // Wall-clock ceiling enforced by nsjail itself, one second beyond the
    // dispatcher's own deadline so the parent observes the timeout first.
    let jail_secs = limits.timeout.as_secs().saturating_add(1);
    out.push_str(&format!("time_limit: {jail_secs}\n"));
    out.push_str(&format!("rlimit_as: {}\n", limits.memory_mib));
    out.push_str(&format!("rlimit_cpu: {}\n", limits.cpu_secs));
    out.push_str("rlimit_fsize: 16\n");
    out.push_str("rlimit_nofile: 64\n");
    out.push_str(&format!("rlimit_nproc: {}\n\n", limits.max_processes));

    out.push_str("clone_newnet: true\n");
    out.push_str("clone_newuser: true\n");
    out.push_str("clone_newns: true\n");
    out.push_str("clone_newpid: true\n");
    out.push_str("clone_newipc: true\n");
    out.push_str("clone_newuts: true\n");
    out.push_str("keep_caps: false\n");
    out.push_str("mount_proc: false\n\n");

    out.push_str("envar: \"PYTHONDONTWRITEBYTECODE=1\"\n");
    out.push_str("envar: \"PYTHONIOENCODING=utf-8\"\n");
    out.push_str("envar: \"LANG=C.UTF-8\"\n\n");

    for (path, mandatory) in SYSTEM_MOUNTS {
        out.push_str(&render_mount(path, path, false, *mandatory));
    }
    out.push_str(&render_mount(
        &escape(&scratch.to_string_lossy()),
        SANDBOX_MOUNT,
        true,
        true,
    ));
    out.push_str("mount {\n  dst: \"/tmp\"\n  fstype: \"tmpfs\"\n  rw: true\n  options: \"size=8388608\"\n}\n");

    out
}

fn render_mount(src: &str, dst: &str, rw: bool, mandatory: bool) -> String {
    format!(
        "mount {{\n  src: \"{src}\"\n  dst: \"{dst}\"\n  is_bind: true\n  rw: {rw}\n  mandatory: {mandatory}\n}}\n"
    )
}

/// Escape a path for inclusion in a double-quoted protobuf text string.
fn escape(path: &str) -> String {
    path.replace('\\', "\\\\").replace('"', "\\\"")
}
