//! Static script validation.
//!
//! Parses submitted source into a syntax tree and rejects contract violations
//! before any code runs: disallowed imports, dynamic-execution primitives,
//! dunder access, and a missing or malformed entry point. Analysis only — the
//! submitted code is never executed or imported here.
//!
//! This check is necessary but not sufficient: it is a defense-in-depth layer
//! ahead of both backends, not a substitute for OS-level enforcement.

use rustpython_parser::{ast, parse, Mode};

use crucible_core::{RejectReason, SandboxConfig, Script, ValidationVerdict};

/// The single required zero-argument entry point.
pub const ENTRY_POINT: &str = "main";

/// Builtin names submitted scripts may never reference.
///
/// Covers dynamic code execution, the mutable builtin namespace, attribute
/// forging, and interactive/filesystem I/O.
pub const DENIED_NAMES: &[&str] = &[
    "eval",
    "exec",
    "compile",
    "globals",
    "locals",
    "vars",
    "getattr",
    "setattr",
    "delattr",
    "open",
    "input",
    "breakpoint",
    "exit",
    "quit",
    "dir",
    "help",
];

/// Statically check a script against the execution contract.
///
/// Returns [`ValidationVerdict::Rejected`] with a reason from the closed
/// taxonomy on the first violation found; order of checks is size, syntax,
/// construct walk, entry point.
#[must_use]
pub fn validate(script: &Script, config: &SandboxConfig) -> ValidationVerdict {
    match run_checks(script, config) {
        Ok(()) => ValidationVerdict::Accepted,
        Err(reason) => ValidationVerdict::Rejected(reason),
    }
}

fn run_checks(script: &Script, config: &SandboxConfig) -> Result<(), RejectReason> {
    let source = script.source();
    if source.trim().is_empty() {
        return Err(RejectReason::EmptyScript);
    }
    if source.len() > config.max_script_bytes {
        return Err(RejectReason::ScriptTooLarge { limit: config.max_script_bytes });
    }

    let body = match parse(source, Mode::Module, "<script>") {
        Ok(ast::Mod::Module(module)) => module.body,
        Ok(_) => {
            return Err(RejectReason::SyntaxError {
                line: 1,
                message: "expected a module".to_owned(),
            })
        }
        Err(err) => {
            return Err(RejectReason::SyntaxError {
                line: line_of_offset(source, err.offset.to_usize()),
                message: err.error.to_string(),
            })
        }
    };

    let walker = Walker { config };
    walker.stmts(&body)?;
    check_entry_point(&body)
}

/// 1-based line number of a byte offset.
fn line_of_offset(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source[..end].bytes().filter(|&b| b == b'\n').count() + 1
}

/// Enforce the entry-point contract over top-level statements only:
/// exactly one plain `def main` taking no parameters.
fn check_entry_point(body: &[ast::Stmt]) -> Result<(), RejectReason> {
    let mut seen = false;

    for stmt in body {
        match stmt {
            ast::Stmt::FunctionDef(def) if def.name.as_str() == ENTRY_POINT => {
                if seen {
                    return Err(RejectReason::InvalidEntryPoint {
                        detail: "main is defined more than once".to_owned(),
                    });
                }
                seen = true;
                let args = &def.args;
                let has_params = !args.posonlyargs.is_empty()
                    || !args.args.is_empty()
                    || args.vararg.is_some()
                    || !args.kwonlyargs.is_empty()
                    || args.kwarg.is_some();
                if has_params {
                    return Err(RejectReason::InvalidEntryPoint {
                        detail: "main() must take no parameters".to_owned(),
                    });
                }
            }
            ast::Stmt::AsyncFunctionDef(def) if def.name.as_str() == ENTRY_POINT => {
                return Err(RejectReason::InvalidEntryPoint {
                    detail: "main must not be an async function".to_owned(),
                });
            }
            ast::Stmt::ClassDef(def) if def.name.as_str() == ENTRY_POINT => {
                return Err(RejectReason::InvalidEntryPoint {
                    detail: "main must be a function, not a class".to_owned(),
                });
            }
            ast::Stmt::Assign(assign) => {
                if assign.targets.iter().any(binds_entry_point) {
                    return Err(RejectReason::InvalidEntryPoint {
                        detail: "main must be a function, not a variable".to_owned(),
                    });
                }
            }
            ast::Stmt::AnnAssign(assign) => {
                if binds_entry_point(&assign.target) {
                    return Err(RejectReason::InvalidEntryPoint {
                        detail: "main must be a function, not a variable".to_owned(),
                    });
                }
            }
            ast::Stmt::AugAssign(assign) => {
                if binds_entry_point(&assign.target) {
                    return Err(RejectReason::InvalidEntryPoint {
                        detail: "main must be a function, not a variable".to_owned(),
                    });
                }
            }
            _ => {}
        }
    }

    if seen {
        Ok(())
    } else {
        Err(RejectReason::MissingEntryPoint)
    }
}

fn binds_entry_point(target: &ast::Expr) -> bool {
    match target {
        ast::Expr::Name(name) => name.id.as_str() == ENTRY_POINT,
        ast::Expr::Tuple(tuple) => tuple.elts.iter().any(binds_entry_point),
        ast::Expr::List(list) => list.elts.iter().any(binds_entry_point),
        ast::Expr::Starred(starred) => binds_entry_point(&starred.value),
        _ => false,
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Recursive syntax-tree walk rejecting disallowed constructs.
struct Walker<'a> {
    config: &'a SandboxConfig,
}

impl Walker<'_> {
    fn stmts(&self, body: &[ast::Stmt]) -> Result<(), RejectReason> {
        for stmt in body {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn stmt(&self, stmt: &ast::Stmt) -> Result<(), RejectReason> {
        match stmt {
            ast::Stmt::FunctionDef(def) => {
                self.arguments(&def.args)?;
                self.exprs(&def.decorator_list)?;
                self.stmts(&def.body)
            }
            ast::Stmt::AsyncFunctionDef(def) => {
                self.arguments(&def.args)?;
                self.exprs(&def.decorator_list)?;
                self.stmts(&def.body)
            }
            ast::Stmt::ClassDef(def) => {
                self.exprs(&def.bases)?;
                self.keywords(&def.keywords)?;
                self.exprs(&def.decorator_list)?;
                self.stmts(&def.body)
            }
            ast::Stmt::Return(ret) => self.opt_expr(ret.value.as_deref()),
            ast::Stmt::Delete(del) => self.exprs(&del.targets),
            ast::Stmt::Assign(assign) => {
                self.exprs(&assign.targets)?;
                self.expr(&assign.value)
            }
            ast::Stmt::AugAssign(assign) => {
                self.expr(&assign.target)?;
                self.expr(&assign.value)
            }
            ast::Stmt::AnnAssign(assign) => {
                self.expr(&assign.target)?;
                self.expr(&assign.annotation)?;
                self.opt_expr(assign.value.as_deref())
            }
            ast::Stmt::For(f) => {
                self.expr(&f.target)?;
                self.expr(&f.iter)?;
                self.stmts(&f.body)?;
                self.stmts(&f.orelse)
            }
            ast::Stmt::AsyncFor(f) => {
                self.expr(&f.target)?;
                self.expr(&f.iter)?;
                self.stmts(&f.body)?;
                self.stmts(&f.orelse)
            }
            ast::Stmt::While(w) => {
                self.expr(&w.test)?;
                self.stmts(&w.body)?;
                self.stmts(&w.orelse)
            }
            ast::Stmt::If(i) => {
                self.expr(&i.test)?;
                self.stmts(&i.body)?;
                self.stmts(&i.orelse)
            }
            ast::Stmt::With(w) => {
                self.with_items(&w.items)?;
                self.stmts(&w.body)
            }
            ast::Stmt::AsyncWith(w) => {
                self.with_items(&w.items)?;
                self.stmts(&w.body)
            }
            ast::Stmt::Match(m) => {
                self.expr(&m.subject)?;
                for case in &m.cases {
                    self.pattern(&case.pattern)?;
                    self.opt_expr(case.guard.as_deref())?;
                    self.stmts(&case.body)?;
                }
                Ok(())
            }
            ast::Stmt::Raise(r) => {
                self.opt_expr(r.exc.as_deref())?;
                self.opt_expr(r.cause.as_deref())
            }
            ast::Stmt::Try(t) => {
                self.stmts(&t.body)?;
                self.handlers(&t.handlers)?;
                self.stmts(&t.orelse)?;
                self.stmts(&t.finalbody)
            }
            ast::Stmt::TryStar(t) => {
                self.stmts(&t.body)?;
                self.handlers(&t.handlers)?;
                self.stmts(&t.orelse)?;
                self.stmts(&t.finalbody)
            }
            ast::Stmt::Assert(a) => {
                self.expr(&a.test)?;
                self.opt_expr(a.msg.as_deref())
            }
            ast::Stmt::Import(import) => {
                for alias in &import.names {
                    self.check_import(alias.name.as_str())?;
                }
                Ok(())
            }
            ast::Stmt::ImportFrom(import) => {
                if import.level.as_ref().is_some_and(|l| l.to_u32() > 0) {
                    return Err(RejectReason::DisallowedImport {
                        module: import
                            .module
                            .as_ref()
                            .map_or_else(|| ".".to_owned(), |m| format!(".{m}")),
                    });
                }
                match &import.module {
                    Some(module) => self.check_import(module.as_str()),
                    None => Err(RejectReason::DisallowedImport { module: ".".to_owned() }),
                }
            }
            ast::Stmt::Global(g) => self.identifiers(&g.names),
            ast::Stmt::Nonlocal(n) => self.identifiers(&n.names),
            ast::Stmt::Expr(e) => self.expr(&e.value),
            // Pass, Break, Continue carry nothing to inspect.
            _ => Ok(()),
        }
    }

    fn expr(&self, expr: &ast::Expr) -> Result<(), RejectReason> {
        match expr {
            ast::Expr::BoolOp(e) => self.exprs(&e.values),
            ast::Expr::NamedExpr(e) => {
                self.expr(&e.target)?;
                self.expr(&e.value)
            }
            ast::Expr::BinOp(e) => {
                self.expr(&e.left)?;
                self.expr(&e.right)
            }
            ast::Expr::UnaryOp(e) => self.expr(&e.operand),
            ast::Expr::Lambda(e) => {
                self.arguments(&e.args)?;
                self.expr(&e.body)
            }
            ast::Expr::IfExp(e) => {
                self.expr(&e.test)?;
                self.expr(&e.body)?;
                self.expr(&e.orelse)
            }
            ast::Expr::Dict(e) => {
                for key in e.keys.iter().flatten() {
                    self.expr(key)?;
                }
                self.exprs(&e.values)
            }
            ast::Expr::Set(e) => self.exprs(&e.elts),
            ast::Expr::ListComp(e) => {
                self.expr(&e.elt)?;
                self.comprehensions(&e.generators)
            }
            ast::Expr::SetComp(e) => {
                self.expr(&e.elt)?;
                self.comprehensions(&e.generators)
            }
            ast::Expr::DictComp(e) => {
                self.expr(&e.key)?;
                self.expr(&e.value)?;
                self.comprehensions(&e.generators)
            }
            ast::Expr::GeneratorExp(e) => {
                self.expr(&e.elt)?;
                self.comprehensions(&e.generators)
            }
            ast::Expr::Await(e) => self.expr(&e.value),
            ast::Expr::Yield(e) => self.opt_expr(e.value.as_deref()),
            ast::Expr::YieldFrom(e) => self.expr(&e.value),
            ast::Expr::Compare(e) => {
                self.expr(&e.left)?;
                self.exprs(&e.comparators)
            }
            ast::Expr::Call(e) => {
                self.expr(&e.func)?;
                self.exprs(&e.args)?;
                self.keywords(&e.keywords)
            }
            ast::Expr::FormattedValue(e) => {
                self.expr(&e.value)?;
                self.opt_expr(e.format_spec.as_deref())
            }
            ast::Expr::JoinedStr(e) => self.exprs(&e.values),
            ast::Expr::Attribute(e) => {
                if is_dunder(e.attr.as_str()) {
                    return Err(RejectReason::DisallowedAttribute {
                        attribute: e.attr.to_string(),
                    });
                }
                self.expr(&e.value)
            }
            ast::Expr::Subscript(e) => {
                self.expr(&e.value)?;
                self.expr(&e.slice)
            }
            ast::Expr::Starred(e) => self.expr(&e.value),
            ast::Expr::Name(e) => self.check_name(e.id.as_str()),
            ast::Expr::List(e) => self.exprs(&e.elts),
            ast::Expr::Tuple(e) => self.exprs(&e.elts),
            ast::Expr::Slice(e) => {
                self.opt_expr(e.lower.as_deref())?;
                self.opt_expr(e.upper.as_deref())?;
                self.opt_expr(e.step.as_deref())
            }
            // Constants carry nothing to inspect.
            _ => Ok(()),
        }
    }

    fn exprs(&self, exprs: &[ast::Expr]) -> Result<(), RejectReason> {
        for expr in exprs {
            self.expr(expr)?;
        }
        Ok(())
    }

    fn opt_expr(&self, expr: Option<&ast::Expr>) -> Result<(), RejectReason> {
        expr.map_or(Ok(()), |e| self.expr(e))
    }

    fn arguments(&self, args: &ast::Arguments) -> Result<(), RejectReason> {
        for arg in args.posonlyargs.iter().chain(&args.args).chain(&args.kwonlyargs) {
            self.opt_expr(arg.default.as_deref())?;
        }
        Ok(())
    }

    fn keywords(&self, keywords: &[ast::Keyword]) -> Result<(), RejectReason> {
        for keyword in keywords {
            self.expr(&keyword.value)?;
        }
        Ok(())
    }

    fn comprehensions(&self, generators: &[ast::Comprehension]) -> Result<(), RejectReason> {
        for generator in generators {
            self.expr(&generator.target)?;
            self.expr(&generator.iter)?;
            self.exprs(&generator.ifs)?;
        }
        Ok(())
    }

    fn with_items(&self, items: &[ast::WithItem]) -> Result<(), RejectReason> {
        for item in items {
            self.expr(&item.context_expr)?;
            self.opt_expr(item.optional_vars.as_deref())?;
        }
        Ok(())
    }

    fn handlers(&self, handlers: &[ast::ExceptHandler]) -> Result<(), RejectReason> {
        for handler in handlers {
            let ast::ExceptHandler::ExceptHandler(h) = handler;
            self.opt_expr(h.type_.as_deref())?;
            self.stmts(&h.body)?;
        }
        Ok(())
    }

    fn pattern(&self, pattern: &ast::Pattern) -> Result<(), RejectReason> {
        match pattern {
            ast::Pattern::MatchValue(p) => self.expr(&p.value),
            ast::Pattern::MatchSequence(p) => self.patterns(&p.patterns),
            ast::Pattern::MatchMapping(p) => {
                self.exprs(&p.keys)?;
                self.patterns(&p.patterns)
            }
            ast::Pattern::MatchClass(p) => {
                self.expr(&p.cls)?;
                self.patterns(&p.patterns)?;
                self.patterns(&p.kwd_patterns)
            }
            ast::Pattern::MatchAs(p) => p.pattern.as_deref().map_or(Ok(()), |inner| self.pattern(inner)),
            ast::Pattern::MatchOr(p) => self.patterns(&p.patterns),
            // MatchSingleton and MatchStar carry nothing to inspect.
            _ => Ok(()),
        }
    }

    fn patterns(&self, patterns: &[ast::Pattern]) -> Result<(), RejectReason> {
        for pattern in patterns {
            self.pattern(pattern)?;
        }
        Ok(())
    }

    fn identifiers(&self, names: &[ast::Identifier]) -> Result<(), RejectReason> {
        for name in names {
            self.check_name(name.as_str())?;
        }
        Ok(())
    }

    fn check_name(&self, name: &str) -> Result<(), RejectReason> {
        if is_dunder(name) {
            return Err(RejectReason::DisallowedName { name: name.to_owned() });
        }
        if DENIED_NAMES.contains(&name) {
            return Err(RejectReason::DisallowedName { name: name.to_owned() });
        }
        Ok(())
    }

    fn check_import(&self, module: &str) -> Result<(), RejectReason> {
        let root = module.split('.').next().unwrap_or(module);
        if self.config.allows_import(root) {
            Ok(())
        } else {
            Err(RejectReason::DisallowedImport { module: root.to_owned() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(source: &str) -> ValidationVerdict {
        validate(&Script::new(source), &SandboxConfig::default())
    }

    fn reject_reason(source: &str) -> RejectReason {
        match verdict(source) {
            ValidationVerdict::Rejected(reason) => reason,
            ValidationVerdict::Accepted => panic!("expected rejection for:\n{source}"),
            _ => unreachable!("unhandled ValidationVerdict variant"),
        }
    }

    #[test]
    fn minimal_valid_script_is_accepted() {
        let v = verdict("def main():\n    return {\"ok\": True}\n");
        assert!(v.is_accepted(), "got {v:?}");
    }

    #[test]
    fn empty_script_is_rejected() {
        assert_eq!(reject_reason("   \n\n"), RejectReason::EmptyScript);
    }

    #[test]
    fn oversized_script_is_rejected() {
        let filler = format!("def main():\n    return 1\n# {}\n", "x".repeat(110 * 1024));
        assert!(matches!(reject_reason(&filler), RejectReason::ScriptTooLarge { .. }));
    }

    #[test]
    fn syntax_error_reports_line() {
        let reason = reject_reason("def main():\n    return (\n");
        match reason {
            RejectReason::SyntaxError { line, .. } => assert!(line >= 1),
            other => panic!("expected SyntaxError, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        assert_eq!(reject_reason("x = 1\n"), RejectReason::MissingEntryPoint);
    }

    #[test]
    fn entry_point_with_parameters_is_rejected() {
        assert!(matches!(
            reject_reason("def main(x):\n    return x\n"),
            RejectReason::InvalidEntryPoint { .. }
        ));
    }

    #[test]
    fn entry_point_with_only_keyword_parameters_is_rejected() {
        assert!(matches!(
            reject_reason("def main(*, flag=False):\n    return flag\n"),
            RejectReason::InvalidEntryPoint { .. }
        ));
    }

    #[test]
    fn entry_point_assigned_as_variable_is_rejected() {
        assert!(matches!(
            reject_reason("main = 42\n"),
            RejectReason::InvalidEntryPoint { .. }
        ));
    }

    #[test]
    fn lambda_entry_point_is_rejected() {
        assert!(matches!(
            reject_reason("main = lambda: {}\n"),
            RejectReason::InvalidEntryPoint { .. }
        ));
    }

    #[test]
    fn async_entry_point_is_rejected() {
        assert!(matches!(
            reject_reason("async def main():\n    return {}\n"),
            RejectReason::InvalidEntryPoint { .. }
        ));
    }

    #[test]
    fn class_entry_point_is_rejected() {
        assert!(matches!(
            reject_reason("class main:\n    pass\n"),
            RejectReason::InvalidEntryPoint { .. }
        ));
    }

    #[test]
    fn duplicate_entry_point_is_rejected() {
        let source = "def main():\n    return 1\n\ndef main():\n    return 2\n";
        assert!(matches!(
            reject_reason(source),
            RejectReason::InvalidEntryPoint { .. }
        ));
    }

    #[test]
    fn os_import_is_rejected_math_is_accepted() {
        assert_eq!(
            reject_reason("import os\n\ndef main():\n    return {}\n"),
            RejectReason::DisallowedImport { module: "os".to_owned() }
        );
        assert!(verdict("import math\n\ndef main():\n    return math.pi\n").is_accepted());
    }

    #[test]
    fn from_import_outside_allowlist_is_rejected() {
        assert_eq!(
            reject_reason("from subprocess import run\n\ndef main():\n    return {}\n"),
            RejectReason::DisallowedImport { module: "subprocess".to_owned() }
        );
    }

    #[test]
    fn submodule_import_checks_root_package() {
        assert_eq!(
            reject_reason("import os.path\n\ndef main():\n    return {}\n"),
            RejectReason::DisallowedImport { module: "os".to_owned() }
        );
    }

    #[test]
    fn relative_import_is_rejected() {
        assert!(matches!(
            reject_reason("from . import thing\n\ndef main():\n    return {}\n"),
            RejectReason::DisallowedImport { .. }
        ));
    }

    #[test]
    fn import_inside_function_body_is_rejected() {
        assert_eq!(
            reject_reason("def main():\n    import socket\n    return {}\n"),
            RejectReason::DisallowedImport { module: "socket".to_owned() }
        );
    }

    #[test]
    fn eval_reference_is_rejected() {
        assert_eq!(
            reject_reason("def main():\n    return eval(\"1+1\")\n"),
            RejectReason::DisallowedName { name: "eval".to_owned() }
        );
    }

    #[test]
    fn exec_reference_is_rejected() {
        assert_eq!(
            reject_reason("def main():\n    exec(\"x = 1\")\n    return {}\n"),
            RejectReason::DisallowedName { name: "exec".to_owned() }
        );
    }

    #[test]
    fn open_reference_is_rejected() {
        assert_eq!(
            reject_reason("def main():\n    f = open(\"/etc/passwd\")\n    return {}\n"),
            RejectReason::DisallowedName { name: "open".to_owned() }
        );
    }

    #[test]
    fn dunder_import_name_is_rejected() {
        assert_eq!(
            reject_reason("def main():\n    m = __import__(\"os\")\n    return {}\n"),
            RejectReason::DisallowedName { name: "__import__".to_owned() }
        );
    }

    #[test]
    fn dunder_attribute_access_is_rejected() {
        assert_eq!(
            reject_reason("def main():\n    return (1).__class__\n"),
            RejectReason::DisallowedAttribute { attribute: "__class__".to_owned() }
        );
    }

    #[test]
    fn dunder_subclasses_walk_is_rejected() {
        let source = "def main():\n    return ().__class__.__bases__[0].__subclasses__()\n";
        assert!(matches!(
            reject_reason(source),
            RejectReason::DisallowedAttribute { .. }
        ));
    }

    #[test]
    fn denied_name_inside_comprehension_is_rejected() {
        let source = "def main():\n    return [open(p) for p in (\"a\",)]\n";
        assert_eq!(
            reject_reason(source),
            RejectReason::DisallowedName { name: "open".to_owned() }
        );
    }

    #[test]
    fn denied_name_inside_fstring_is_rejected() {
        let source = "def main():\n    return f\"{eval('1')}\"\n";
        assert_eq!(
            reject_reason(source),
            RejectReason::DisallowedName { name: "eval".to_owned() }
        );
    }

    #[test]
    fn denied_name_in_default_argument_is_rejected() {
        let source = "def helper(f=open):\n    return f\n\ndef main():\n    return {}\n";
        assert_eq!(
            reject_reason(source),
            RejectReason::DisallowedName { name: "open".to_owned() }
        );
    }

    #[test]
    fn getattr_is_rejected() {
        let source = "def main():\n    return getattr({}, \"keys\")\n";
        assert_eq!(
            reject_reason(source),
            RejectReason::DisallowedName { name: "getattr".to_owned() }
        );
    }

    #[test]
    fn ordinary_attribute_access_is_accepted() {
        let source = "import math\n\ndef main():\n    return math.sqrt(2)\n";
        assert!(verdict(source).is_accepted());
    }

    #[test]
    fn print_and_helpers_are_accepted() {
        let source = "def helper(n):\n    return n * 2\n\ndef main():\n    print(\"hi\")\n    return {\"n\": helper(21)}\n";
        assert!(verdict(source).is_accepted());
    }

    #[test]
    fn validation_never_panics_on_arbitrary_text() {
        // Sanity sweep over clearly invalid inputs.
        for source in ["\0\0\0", "def def def", "(((((", "import", "🦀🦀🦀", "\u{7f}x = "] {
            let _ = verdict(source);
        }
    }

    proptest::proptest! {
        #[test]
        fn proptest_validate_total_over_ascii(source in "[ -~\\n]{0,256}") {
            // Whatever the input, validation must terminate with a verdict.
            let _ = verdict(&source);
        }

        #[test]
        fn proptest_rejects_any_non_allowlisted_single_import(
            module in "[a-z][a-z0-9_]{0,10}",
        ) {
            let config = SandboxConfig::default();
            let source = format!("import {module}\n\ndef main():\n    return {{}}\n");
            let v = validate(&Script::new(&source), &config);
            if config.allows_import(&module) {
                proptest::prop_assert!(v.is_accepted());
            } else {
                let rejected_import = matches!(
                    v,
                    ValidationVerdict::Rejected(RejectReason::DisallowedImport { .. })
                );
                proptest::prop_assert!(rejected_import);
            }
        }
    }
}
