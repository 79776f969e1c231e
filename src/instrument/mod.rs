//! The instrumenting transformer.
//!
//! One handler per AST node kind, dispatched statically over the parser's
//! tagged variants. Each handler emits an equivalent source fragment whose
//! evaluation produces the original value or effect and reports it to the
//! runtime hook table. Scope frames are pushed before a region's body is
//! walked, and the region's declare hooks are emitted before any of its
//! statements.
//!
//! Submodules:
//! - [`registry`] - id allocation and the id-to-location table
//! - [`patterns`] - binding-pattern name collection
//! - [`scope`] - frames and the hoisted/lexical pre-passes
//! - [`hooks`] - the fixed runtime hook name table
//! - [`expressions`] / [`statements`] - the emit handlers

pub mod hooks;
pub mod patterns;
pub mod registry;
pub mod scope;

mod expressions;
mod statements;

#[cfg(test)]
mod tests;

use crate::diagnostics::TransformError;
use crate::parser::ast::{ArrowBody, ArrowFunction, Expr, Function, Loc, Program};
use crate::source_writer::{NewLineKind, SourceWriter};

use hooks::{Hook, RUNTIME_GLOBAL};
use registry::{Iid, Registry};
use scope::{ScopeFrame, ScopeStack, VarKind};

/// Knobs for the emitted text. Defaults match the tool's own output style.
#[derive(Clone, Debug)]
pub struct InstrumentOptions {
    /// Indentation string for emitted code.
    pub indent: String,
    /// Line terminator for emitted code.
    pub newline: NewLineKind,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        InstrumentOptions {
            indent: "    ".to_string(),
            newline: NewLineKind::LineFeed,
        }
    }
}

/// Per-file transformer state. Created at the start of a file, discarded
/// once the output has been taken.
pub struct Instrumenter<'a> {
    /// Original file path, used in diagnostics and the script-enter hook.
    file: &'a str,
    /// Path of the instrumented output, reported in the script-enter hook.
    inst_path: &'a str,
    writer: SourceWriter,
    registry: Registry,
    scopes: ScopeStack,
    /// LHS context: identifiers denote binding targets and are emitted
    /// bare instead of being wrapped in a read hook.
    in_lhs: bool,
}

impl<'a> Instrumenter<'a> {
    pub fn new(file: &'a str, inst_path: &'a str, options: &InstrumentOptions) -> Self {
        let mut writer = SourceWriter::with_capacity(4096);
        writer.set_indent_str(&options.indent);
        writer.set_new_line_kind(options.newline);
        Instrumenter {
            file,
            inst_path,
            writer,
            registry: Registry::new(),
            scopes: ScopeStack::new(),
            in_lhs: false,
        }
    }

    /// Walk the program root and fill the output buffer.
    ///
    /// The whole script body lands in a `try`/`catch`/`finally` scaffold:
    /// script-enter fires first, the program region's declare hooks follow,
    /// an escaping exception reaches the uncaught hook, and script-exit
    /// runs in `finally`.
    pub fn run(&mut self, program: &Program) -> Result<(), TransformError> {
        let mut frame = ScopeFrame::new(false);
        scope::hoisted_pass(&program.body, &mut frame);
        scope::lexical_pass(&program.body, &mut frame);
        self.scopes.push(frame);

        self.writer.write("try {");
        self.writer.write_line();
        self.writer.increase_indent();

        let se_id = self.new_id(program.loc);
        self.hook_open(Hook::ScriptEnter, se_id);
        self.arg_sep();
        let inst_path = self.inst_path;
        self.write_js_string(inst_path);
        self.arg_sep();
        let orig_path = self.file;
        self.write_js_string(orig_path);
        self.hook_close();
        self.end_stmt();

        self.emit_scope_declares();
        for stmt in &program.body {
            self.emit_stmt(stmt)?;
        }
        self.emit_scaffold_close(program.loc, Hook::ScriptExit);
        self.writer.write_line();
        self.scopes.pop();
        Ok(())
    }

    /// Tear down into the output text and the id registry.
    pub fn finish(self) -> (String, Registry) {
        (self.writer.take_output(), self.registry)
    }

    // =========================================================================
    // Ids
    // =========================================================================

    fn new_id(&mut self, loc: Loc) -> Iid {
        self.registry.new_id(Some(loc))
    }

    /// Id for a site with no originating node (declare hooks, the update
    /// expression's implicit binary): allocated, but absent from the table.
    fn synth_id(&mut self) -> Iid {
        self.registry.new_id(None)
    }

    // =========================================================================
    // Hook-call plumbing
    // =========================================================================

    fn hook_open(&mut self, hook: Hook, id: Iid) {
        self.writer.write(RUNTIME_GLOBAL);
        self.writer.write_char('.');
        self.writer.write(hook.short());
        self.writer.write_char('(');
        self.writer.write_u32(id);
    }

    fn arg_sep(&mut self) {
        self.writer.write(", ");
    }

    fn hook_close(&mut self) {
        self.writer.write_char(')');
    }

    fn end_stmt(&mut self) {
        self.writer.write_char(';');
        self.writer.write_line();
    }

    /// A JSON-escaped string literal; JSON string syntax is valid
    /// JavaScript.
    fn write_js_string(&mut self, s: &str) {
        let quoted = serde_json::Value::String(s.to_string()).to_string();
        self.writer.write(&quoted);
    }

    /// Operator and kind strings are plain ASCII and need no escaping.
    fn write_quoted(&mut self, s: &str) {
        self.writer.write_char('"');
        self.writer.write(s);
        self.writer.write_char('"');
    }

    fn write_bool(&mut self, value: bool) {
        self.writer.write(if value { "true" } else { "false" });
    }

    fn write_name_list(&mut self, names: &[String]) {
        self.writer.write_char('[');
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.arg_sep();
            }
            self.write_js_string(name);
        }
        self.writer.write_char(']');
    }

    // =========================================================================
    // LHS-context discipline
    // =========================================================================

    fn with_lhs<F>(&mut self, f: F) -> Result<(), TransformError>
    where
        F: FnOnce(&mut Self) -> Result<(), TransformError>,
    {
        let prev = std::mem::replace(&mut self.in_lhs, true);
        let result = f(self);
        self.in_lhs = prev;
        result
    }

    fn with_rhs<F>(&mut self, f: F) -> Result<(), TransformError>
    where
        F: FnOnce(&mut Self) -> Result<(), TransformError>,
    {
        let prev = std::mem::replace(&mut self.in_lhs, false);
        let result = f(self);
        self.in_lhs = prev;
        result
    }

    // =========================================================================
    // Shared emission pieces
    // =========================================================================

    /// Declare hooks for every name of the current frame, in insertion
    /// order. Lexical names are still in their TDZ, so their hooks omit the
    /// value argument; everything else passes its current binding.
    fn emit_scope_declares(&mut self) {
        let names: Vec<(String, VarKind)> = self.scopes.current().names().to_vec();
        for (name, kind) in names {
            let id = self.synth_id();
            self.hook_open(Hook::Declare, id);
            self.arg_sep();
            self.write_js_string(&name);
            self.arg_sep();
            self.write_quoted(kind.as_str());
            if !kind.is_lexical() {
                self.arg_sep();
                self.writer.write(&name);
            }
            self.hook_close();
            self.end_stmt();
        }
    }

    /// `E(id, expr)` - the expression-result hook around a walked
    /// expression.
    fn emit_expr_hook(&mut self, expr: &Expr) -> Result<(), TransformError> {
        let id = self.new_id(expr.loc());
        self.hook_open(Hook::Expr, id);
        self.arg_sep();
        self.emit_expr(expr)?;
        self.hook_close();
        Ok(())
    }

    /// `C(id, "<kw>", E(id2, test))` - the condition hook for statement
    /// tests.
    fn emit_condition(&mut self, kw: &str, test: &Expr) -> Result<(), TransformError> {
        let id = self.new_id(test.loc());
        self.hook_open(Hook::Condition, id);
        self.arg_sep();
        self.write_quoted(kw);
        self.arg_sep();
        self.emit_expr_hook(test)?;
        self.hook_close();
        Ok(())
    }

    /// Close the `try` block of a scaffold and emit
    /// `catch (e) { X(id, e); } finally { <exit>(id); }`. The runtime's
    /// uncaught hook re-throws after recording, preserving the host's
    /// exception semantics.
    fn emit_scaffold_close(&mut self, loc: Loc, exit_hook: Hook) {
        self.writer.decrease_indent();
        self.writer.write("} catch (e) {");
        self.writer.write_line();
        self.writer.increase_indent();
        let x_id = self.new_id(loc);
        self.hook_open(Hook::Uncaught, x_id);
        self.arg_sep();
        self.writer.write("e");
        self.hook_close();
        self.end_stmt();
        self.writer.decrease_indent();
        self.writer.write("} finally {");
        self.writer.write_line();
        self.writer.increase_indent();
        let exit_id = self.new_id(loc);
        self.hook_open(exit_hook, exit_id);
        self.hook_close();
        self.end_stmt();
        self.writer.decrease_indent();
        self.writer.write_char('}');
    }

    /// Emit a `function` form: header, then the body inside the
    /// enter/uncaught/exit scaffold, preceded by the function region's
    /// declare hooks. `is_expression` controls whether the function's own
    /// name joins its frame (named function expressions bind their name
    /// inside themselves; declarations bind it in the enclosing region).
    fn emit_function(
        &mut self,
        func: &Function,
        is_expression: bool,
    ) -> Result<(), TransformError> {
        if func.is_async {
            self.writer.write("async ");
        }
        self.writer.write("function");
        if func.is_generator {
            self.writer.write_char('*');
        }
        if let Some(name) = &func.name {
            self.writer.write_space();
            self.writer.write(&name.name);
        }
        self.writer.write_char('(');
        for (i, param) in func.params.iter().enumerate() {
            if i > 0 {
                self.arg_sep();
            }
            self.emit_pat(param)?;
        }
        self.writer.write(") {");
        self.writer.write_line();
        self.writer.increase_indent();

        let mut frame = ScopeFrame::new(false);
        frame.declare("arguments", VarKind::Arguments);
        if is_expression {
            if let Some(name) = &func.name {
                frame.declare(&name.name, VarKind::Func);
            }
        }
        for param in &func.params {
            for name in patterns::collect_identifiers(param) {
                frame.declare(&name, VarKind::Param);
            }
        }
        scope::hoisted_pass(&func.body.body, &mut frame);
        scope::lexical_pass(&func.body.body, &mut frame);
        self.scopes.push(frame);

        self.writer.write("try {");
        self.writer.write_line();
        self.writer.increase_indent();
        let fe_id = self.new_id(func.loc);
        self.hook_open(Hook::FunctionEnter, fe_id);
        self.arg_sep();
        match &func.name {
            Some(name) => self.writer.write(&name.name),
            None => self.writer.write("null"),
        }
        self.arg_sep();
        self.writer.write("this");
        self.arg_sep();
        self.writer.write("arguments");
        self.hook_close();
        self.end_stmt();

        self.emit_scope_declares();
        for stmt in &func.body.body {
            self.emit_stmt(stmt)?;
        }
        self.emit_scaffold_close(func.loc, Hook::FunctionExit);
        self.scopes.pop();

        self.writer.write_line();
        self.writer.decrease_indent();
        self.writer.write_char('}');
        Ok(())
    }

    /// Arrow functions reuse the function scaffold but have no `arguments`
    /// binding and no own name: the enter hook receives `null` for both
    /// callee and arguments. Expression bodies become a block with an
    /// explicit instrumented `return`.
    fn emit_arrow(&mut self, arrow: &ArrowFunction) -> Result<(), TransformError> {
        if arrow.is_async {
            self.writer.write("async ");
        }
        self.writer.write_char('(');
        for (i, param) in arrow.params.iter().enumerate() {
            if i > 0 {
                self.arg_sep();
            }
            self.emit_pat(param)?;
        }
        self.writer.write(") => {");
        self.writer.write_line();
        self.writer.increase_indent();

        let mut frame = ScopeFrame::new(false);
        for param in &arrow.params {
            for name in patterns::collect_identifiers(param) {
                frame.declare(&name, VarKind::Param);
            }
        }
        if let ArrowBody::Block(block) = &arrow.body {
            scope::hoisted_pass(&block.body, &mut frame);
            scope::lexical_pass(&block.body, &mut frame);
        }
        self.scopes.push(frame);

        self.writer.write("try {");
        self.writer.write_line();
        self.writer.increase_indent();
        let fe_id = self.new_id(arrow.loc);
        self.hook_open(Hook::FunctionEnter, fe_id);
        self.arg_sep();
        self.writer.write("null");
        self.arg_sep();
        self.writer.write("this");
        self.arg_sep();
        self.writer.write("null");
        self.hook_close();
        self.end_stmt();

        self.emit_scope_declares();
        match &arrow.body {
            ArrowBody::Block(block) => {
                for stmt in &block.body {
                    self.emit_stmt(stmt)?;
                }
            }
            ArrowBody::Expr(expr) => {
                self.writer.write("return ");
                let re_id = self.new_id(expr.loc());
                self.hook_open(Hook::Return, re_id);
                self.arg_sep();
                self.emit_expr_hook(expr)?;
                self.hook_close();
                self.end_stmt();
            }
        }
        self.emit_scaffold_close(arrow.loc, Hook::FunctionExit);
        self.scopes.pop();

        self.writer.write_line();
        self.writer.decrease_indent();
        self.writer.write_char('}');
        Ok(())
    }
}
