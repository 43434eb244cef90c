//! Restricted in-process execution backend.
//!
//! Runs validated scripts inside an embedded RustPython interpreter when
//! OS-level namespace isolation is unavailable. Each request gets a fresh
//! interpreter on its own worker thread: no scope, hook, or watchdog state
//! can leak into the next execution.
//!
//! # Isolation limitations
//!
//! This backend is the weaker path and is documented as such rather than
//! silently upgraded:
//!
//! - There is **no CPU or memory ceiling** — only the wall-clock deadline.
//! - The deadline is best-effort: the worker thread is abandoned on expiry
//!   and cannot be interrupted inside a native or blocking call.
//! - Allowlisted pure-Python modules may internally reach modules outside
//!   the allowlist; only OS-level enforcement closes that traversal.
//!
//! The dispatcher only selects this backend after the isolation probe fails,
//! and logs a distinct warning when it does.

use std::sync::Arc;

use async_trait::async_trait;
use rustpython_vm::builtins::PyBaseExceptionRef;
use rustpython_vm::compiler::Mode;
use rustpython_vm::function::FuncArgs;
use rustpython_vm::{AsObject, Interpreter, PyObjectRef, Settings, VirtualMachine};

use crucible_core::{BackendKind, ExecutionOutcome, ResourceLimits, SandboxConfig, Script};

use crate::backend::ExecutionBackend;
use crate::convert::py_to_json;
use crate::output::OutputBuffer;
use crate::validator::ENTRY_POINT;
use crate::EngineError;

/// Stack size for interpreter worker threads; RustPython recurses deeply.
const WORKER_STACK_BYTES: usize = 8 * 1024 * 1024;

/// In-process execution under a reduced namespace.
#[derive(Debug, Clone)]
pub struct RestrictedBackend {
    config: Arc<SandboxConfig>,
}

impl RestrictedBackend {
    /// Create a backend sharing the process-wide configuration.
    #[must_use]
    pub fn new(config: Arc<SandboxConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ExecutionBackend for RestrictedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Restricted
    }

    async fn execute(&self, script: &Script, limits: ResourceLimits) -> ExecutionOutcome {
        let stdout = OutputBuffer::new(limits.max_output_bytes);
        let stderr = OutputBuffer::new(limits.max_output_bytes);
        let (tx, rx) = tokio::sync::oneshot::channel();

        let source = script.source().to_owned();
        let allowlist = self.config.import_allowlist.clone();
        let worker_stdout = stdout.clone();
        let worker_stderr = stderr.clone();

        let spawned = std::thread::Builder::new()
            .name("crucible-restricted".to_owned())
            .stack_size(WORKER_STACK_BYTES)
            .spawn(move || {
                let result = run_interpreter(&source, &allowlist, &worker_stdout, &worker_stderr);
                // The receiver is gone if the deadline already fired; the
                // late result must be a no-op.
                let _ = tx.send(result);
            });

        if let Err(e) = spawned {
            return ExecutionOutcome::SandboxFailure {
                diagnostic: format!("failed to spawn interpreter worker: {e}"),
            };
        }

        match tokio::time::timeout(limits.timeout, rx).await {
            Ok(Ok(Ok(value))) => ExecutionOutcome::Success { value, stdout: stdout.snapshot() },
            Ok(Ok(Err(message))) => {
                let err_tail = stderr.snapshot();
                if !err_tail.is_empty() {
                    tracing::debug!(stderr = %err_tail, "script wrote to stderr before failing");
                }
                ExecutionOutcome::RuntimeError { message, stdout: stdout.snapshot() }
            }
            Ok(Err(_closed)) => ExecutionOutcome::RuntimeError {
                message: "execution worker terminated unexpectedly".to_owned(),
                stdout: stdout.snapshot(),
            },
            Err(_elapsed) => {
                tracing::warn!(
                    timeout_secs = limits.timeout.as_secs(),
                    "deadline expired; abandoning interpreter worker"
                );
                ExecutionOutcome::Timeout { stdout: stdout.snapshot() }
            }
        }
    }

    async fn probe(&self) -> Result<(), EngineError> {
        // The embedded interpreter is always available.
        Ok(())
    }
}

/// Run one script to completion inside a fresh interpreter.
///
/// Returns the converted return value, or a caller-facing failure message.
fn run_interpreter(
    source: &str,
    allowlist: &[String],
    stdout: &OutputBuffer,
    stderr: &OutputBuffer,
) -> Result<serde_json::Value, String> {
    let interp = build_interpreter();

    interp.enter(|vm| {
        install_stream_capture(vm, stdout, stderr);
        install_import_hook(vm, allowlist).map_err(|exc| describe_exception(vm, &exc))?;

        let scope = vm.new_scope_with_builtins();
        scope
            .globals
            .set_item("__name__", vm.ctx.new_str("__main__").into(), vm)
            .map_err(|exc| describe_exception(vm, &exc))?;

        // Shadow denied builtins inside the execution namespace. The
        // validator already rejects references to these names; the shadows
        // keep the namespace minimal even if a construct slips through.
        let guard = vm
            .compile(NAMESPACE_GUARD, Mode::Exec, "<guard>".to_owned())
            .map_err(|e| format!("internal guard compile error: {e}"))?;
        vm.run_code_obj(guard, scope.clone())
            .map_err(|exc| describe_exception(vm, &exc))?;

        let code = vm
            .compile(source, Mode::Exec, "<script>".to_owned())
            .map_err(|e| format!("compile error: {e}"))?;
        vm.run_code_obj(code, scope.clone())
            .map_err(|exc| describe_exception(vm, &exc))?;

        let globals_obj: PyObjectRef = scope.globals.clone().into();
        let entry = vm
            .call_method(&globals_obj, "get", (vm.ctx.new_str(ENTRY_POINT),))
            .map_err(|exc| describe_exception(vm, &exc))?;
        if vm.is_none(&entry) {
            return Err("script must define a main() function".to_owned());
        }

        let result = entry
            .call((), vm)
            .map_err(|exc| describe_exception(vm, &exc))?;

        py_to_json(vm, &result, 0)
    })
}

/// Candidate host locations for the pure-Python standard library.
///
/// Native modules come from `rustpython_stdlib`; pure-Python wrappers (json,
/// random, statistics, …) are resolved from a host installation when present.
fn python_stdlib_paths() -> Vec<String> {
    [
        "/usr/local/lib/python3.13",
        "/usr/local/lib/python3.12",
        "/usr/local/lib/python3.11",
        "/usr/lib/python3.13",
        "/usr/lib/python3.12",
        "/usr/lib/python3.11",
        "/usr/lib/python3.10",
        "/usr/lib/python3",
    ]
    .iter()
    .filter(|p| std::path::Path::new(p).is_dir())
    .map(|p| (*p).to_owned())
    .collect()
}

fn build_interpreter() -> Interpreter {
    let mut settings = Settings::default();
    for path in python_stdlib_paths() {
        settings.path_list.push(path);
    }
    Interpreter::with_init(settings, |vm| {
        vm.add_native_modules(rustpython_stdlib::get_module_inits());
    })
}

/// Replace `sys.stdout` / `sys.stderr` with bounded capturing writers.
fn install_stream_capture(vm: &VirtualMachine, stdout: &OutputBuffer, stderr: &OutputBuffer) {
    let stdout_obj = build_writer_object(vm, stdout.clone());
    let stderr_obj = build_writer_object(vm, stderr.clone());
    let _ = vm.sys_module.set_attr("stdout", stdout_obj, vm);
    let _ = vm.sys_module.set_attr("stderr", stderr_obj, vm);
}

/// Build a minimal Python object with `write(s)` and `flush()` methods whose
/// writes land in `buffer`.
fn build_writer_object(vm: &VirtualMachine, buffer: OutputBuffer) -> PyObjectRef {
    let write_buffer = buffer.clone();
    let write_fn = vm.new_function(
        "write",
        move |args: FuncArgs, vm: &VirtualMachine| -> rustpython_vm::PyResult<PyObjectRef> {
            let data = args
                .args
                .first()
                .and_then(|o| o.str(vm).ok())
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default();
            write_buffer.push(&data);
            Ok(vm.ctx.new_int(data.len()).into())
        },
    );
    let flush_fn = vm.new_function(
        "flush",
        move |_args: FuncArgs, vm: &VirtualMachine| -> rustpython_vm::PyResult<PyObjectRef> {
            Ok(vm.ctx.none())
        },
    );

    let ns = vm.new_module("<writer>", vm.ctx.new_dict(), None);
    let _ = ns.set_attr("write", write_fn, vm);
    let _ = ns.set_attr("flush", flush_fn, vm);
    let _ = ns.set_attr("closed", vm.ctx.new_bool(false), vm);
    let _ = ns.set_attr("encoding", vm.ctx.new_str("utf-8"), vm);
    ns.into()
}

/// Install a `builtins.__import__` override enforcing the allowlist for user
/// code. Imports originating from module internals (any `__name__` other than
/// `__main__`) pass through so allowlisted modules can load their own
/// dependencies.
fn install_import_hook(
    vm: &VirtualMachine,
    allowlist: &[String],
) -> Result<(), PyBaseExceptionRef> {
    let hook_source = format!(
        r#"
import builtins as _b

_allowed = {allowed}
_original_import = _b.__import__

def _guarded_import(name, globals=None, locals=None, fromlist=(), level=0):
    caller = (globals or {{}}).get('__name__')
    if caller == '__main__' and level == 0:
        root = name.split('.')[0]
        if root not in _allowed:
            raise ImportError("import of module '" + root + "' is not permitted")
    return _original_import(name, globals, locals, fromlist, level)

_b.__import__ = _guarded_import
"#,
        allowed = python_set_literal(allowlist),
    );

    let code = vm
        .compile(&hook_source, Mode::Exec, "<import-hook>".to_owned())
        .map_err(|e| vm.new_runtime_error(format!("import hook compile failed: {e}")))?;
    let scope = vm.new_scope_with_builtins();
    vm.run_code_obj(code, scope)?;
    Ok(())
}

/// Render the allowlist as a Python set literal.
///
/// Only plausible module identifiers are embedded; anything else could not
/// be imported anyway and must not reach generated source.
fn python_set_literal(allowlist: &[String]) -> String {
    let entries: Vec<String> = allowlist
        .iter()
        .filter(|m| {
            !m.is_empty()
                && m.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
        .map(|m| format!("'{m}'"))
        .collect();
    if entries.is_empty() {
        "set()".to_owned()
    } else {
        format!("{{{}}}", entries.join(", "))
    }
}

/// Denied builtins are shadowed inside the execution namespace.
const NAMESPACE_GUARD: &str = r#"
def _blocked(*_args, **_kwargs):
    raise RuntimeError("this operation is not permitted in the sandbox")

open = _blocked
eval = _blocked
exec = _blocked
compile = _blocked
input = _blocked
breakpoint = _blocked
getattr = _blocked
setattr = _blocked
delattr = _blocked
vars = _blocked
globals = _blocked
locals = _blocked
dir = _blocked
help = _blocked
exit = _blocked
quit = _blocked
"#;

/// One-line `Type: message` rendering of an exception; the traceback goes to
/// the debug log only and is never surfaced.
fn describe_exception(vm: &VirtualMachine, exc: &PyBaseExceptionRef) -> String {
    let type_name = exc.class().name().to_string();
    let message = exc
        .as_object()
        .str(vm)
        .map(|s| s.as_str().to_owned())
        .unwrap_or_default();

    let mut traceback = String::new();
    if vm.write_exception(&mut traceback, exc).is_ok() {
        tracing::debug!(exception = %type_name, %traceback, "script raised");
    }

    if message.is_empty() {
        type_name
    } else {
        format!("{type_name}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_literal_renders_all_entries() {
        let lit = python_set_literal(&["math".to_owned(), "json".to_owned()]);
        assert!(lit.starts_with('{') && lit.ends_with('}'));
        assert!(lit.contains("'math'"));
        assert!(lit.contains("'json'"));
    }

    #[test]
    fn set_literal_skips_suspicious_entries() {
        let lit = python_set_literal(&["ma'th".to_owned(), "js}on".to_owned()]);
        assert_eq!(lit, "set()");
    }

    #[test]
    fn set_literal_of_empty_allowlist_is_empty_set() {
        assert_eq!(python_set_literal(&[]), "set()");
    }
}
