//! Statement handlers.
//!
//! Statement bodies are always emitted braced, so hook calls and declare
//! hooks can precede them without changing semantics. Regions that own a
//! frame (blocks, catch clauses, switch bodies, lexical for-headers,
//! for-in/of bodies) push it before their body is walked and emit its
//! declare hooks first.

use crate::diagnostics::TransformError;
use crate::parser::ast::{
    AssignTarget, BlockStmt, DoWhileStmt, Expr, ForHead, ForInit, ForStmt, IfStmt, ReturnStmt,
    Stmt, SwitchStmt, ThrowStmt, TryStmt, VarDecl, WhileStmt,
};

use super::hooks::{Hook, TEMP_VALUE};
use super::patterns::collect_identifiers;
use super::scope::{self, ScopeFrame, VarKind};
use super::Instrumenter;

impl Instrumenter<'_> {
    pub(super) fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), TransformError> {
        match stmt {
            Stmt::Block(block) => {
                self.emit_block(block, &[])?;
                self.writer.write_line();
            }
            Stmt::VarDecl(decl) => {
                self.emit_var_decl(decl)?;
                self.end_stmt();
            }
            Stmt::FnDecl(func) => {
                self.emit_function(func, false)?;
                self.writer.write_line();
            }
            Stmt::Expr(stmt) => {
                // Every top-level expression result is captured.
                self.emit_expr_hook(&stmt.expr)?;
                self.end_stmt();
            }
            Stmt::If(stmt) => self.emit_if(stmt)?,
            Stmt::While(stmt) => self.emit_while(stmt)?,
            Stmt::DoWhile(stmt) => self.emit_do_while(stmt)?,
            Stmt::For(stmt) => self.emit_for(stmt, &[])?,
            Stmt::ForIn(stmt) => {
                self.emit_for_in_of(&stmt.left, &stmt.right, &stmt.body, true)?
            }
            Stmt::ForOf(stmt) => {
                self.emit_for_in_of(&stmt.left, &stmt.right, &stmt.body, false)?
            }
            Stmt::Switch(stmt) => self.emit_switch(stmt)?,
            Stmt::Try(stmt) => self.emit_try(stmt)?,
            Stmt::Return(stmt) => self.emit_return(stmt)?,
            Stmt::Throw(stmt) => self.emit_throw(stmt)?,
            Stmt::Break(stmt) => {
                self.writer.write("break");
                if let Some(label) = &stmt.label {
                    self.writer.write_space();
                    self.writer.write(&label.name);
                }
                self.end_stmt();
            }
            Stmt::Continue(stmt) => {
                self.writer.write("continue");
                if let Some(label) = &stmt.label {
                    self.writer.write_space();
                    self.writer.write(&label.name);
                }
                self.end_stmt();
            }
            Stmt::Labeled(stmt) => {
                // Collect the whole label chain first: labels on a lexical
                // `for` must land on the loop inside its synthesized
                // wrapper block, or `continue <label>` would target a
                // plain block and no longer parse.
                let mut labels = vec![stmt.label.name.as_str()];
                let mut body: &Stmt = &stmt.body;
                while let Stmt::Labeled(inner) = body {
                    labels.push(inner.label.name.as_str());
                    body = &inner.body;
                }
                if let Stmt::For(for_stmt) = body {
                    self.emit_for(for_stmt, &labels)?;
                } else {
                    for label in &labels {
                        self.writer.write(label);
                        self.writer.write(": ");
                    }
                    self.emit_stmt(body)?;
                }
            }
            Stmt::Debugger(_) => {
                self.writer.write("debugger");
                self.end_stmt();
            }
            Stmt::Empty(_) => {
                self.end_stmt();
            }
        }
        Ok(())
    }

    /// A block: lexical-only frame over its immediate children, declare
    /// hooks, then the statements. `extra` pre-seeds the frame (loop
    /// headers re-declare their names per iteration).
    pub(super) fn emit_block(
        &mut self,
        block: &BlockStmt,
        extra: &[(String, VarKind)],
    ) -> Result<(), TransformError> {
        self.writer.write_char('{');
        self.writer.write_line();
        self.writer.increase_indent();

        let mut frame = ScopeFrame::new(true);
        for (name, kind) in extra {
            frame.declare(name, *kind);
        }
        scope::lexical_pass(&block.body, &mut frame);
        self.scopes.push(frame);
        self.emit_scope_declares();
        for stmt in &block.body {
            self.emit_stmt(stmt)?;
        }
        self.scopes.pop();

        self.writer.decrease_indent();
        self.writer.write_char('}');
        Ok(())
    }

    /// Emit a statement body braced. A non-block body cannot carry
    /// declarations, but still gets braces so inserted hooks stay inside
    /// the construct.
    fn emit_braced(
        &mut self,
        stmt: &Stmt,
        extra: &[(String, VarKind)],
    ) -> Result<(), TransformError> {
        if let Stmt::Block(block) = stmt {
            return self.emit_block(block, extra);
        }
        self.writer.write_char('{');
        self.writer.write_line();
        self.writer.increase_indent();
        let mut frame = ScopeFrame::new(true);
        for (name, kind) in extra {
            frame.declare(name, *kind);
        }
        self.scopes.push(frame);
        self.emit_scope_declares();
        self.emit_stmt(stmt)?;
        self.scopes.pop();
        self.writer.decrease_indent();
        self.writer.write_char('}');
        Ok(())
    }

    /// `kind d1, d2, ...` without the terminator; the enclosing region's
    /// pre-pass already recorded the names, so declarators just thread
    /// through. An initializer becomes a write of the expression hook's
    /// value assigned to the pattern.
    pub(super) fn emit_var_decl(&mut self, decl: &VarDecl) -> Result<(), TransformError> {
        self.writer.write(decl.kind.as_str());
        self.writer.write_space();
        for (i, declarator) in decl.decls.iter().enumerate() {
            if i > 0 {
                self.arg_sep();
            }
            self.emit_pat(&declarator.name)?;
            let Some(init) = &declarator.init else {
                continue;
            };
            self.writer.write(" = ");
            let names = collect_identifiers(&declarator.name);
            let w_id = self.new_id(declarator.loc);
            self.hook_open(Hook::Write, w_id);
            self.arg_sep();
            self.write_name_list(&names);
            self.arg_sep();
            self.emit_expr_hook(init)?;
            self.hook_close();
        }
        Ok(())
    }

    fn emit_if(&mut self, stmt: &IfStmt) -> Result<(), TransformError> {
        self.writer.write("if (");
        self.emit_condition("if", &stmt.test)?;
        self.writer.write(") ");
        self.emit_braced(&stmt.cons, &[])?;
        if let Some(alt) = &stmt.alt {
            self.writer.write(" else ");
            self.emit_braced(alt, &[])?;
        }
        self.writer.write_line();
        Ok(())
    }

    fn emit_while(&mut self, stmt: &WhileStmt) -> Result<(), TransformError> {
        self.writer.write("while (");
        self.emit_condition("while", &stmt.test)?;
        self.writer.write(") ");
        self.emit_braced(&stmt.body, &[])?;
        self.writer.write_line();
        Ok(())
    }

    fn emit_do_while(&mut self, stmt: &DoWhileStmt) -> Result<(), TransformError> {
        self.writer.write("do ");
        self.emit_braced(&stmt.body, &[])?;
        self.writer.write(" while (");
        self.emit_condition("do-while", &stmt.test)?;
        self.writer.write(")");
        self.end_stmt();
        Ok(())
    }

    /// Classic `for`. A lexical header gets a synthesized outer block that
    /// declares the header names once, and the body block re-declares them
    /// so each iteration observes fresh lexical declarations. `labels` are
    /// written directly before the loop keyword, inside any wrapper block,
    /// so `break`/`continue` keep an iteration statement as their target.
    fn emit_for(&mut self, stmt: &ForStmt, labels: &[&str]) -> Result<(), TransformError> {
        let header: Vec<(String, VarKind)> = match &stmt.init {
            Some(ForInit::VarDecl(decl)) if decl.kind.is_lexical() => {
                let kind = VarKind::from(decl.kind);
                decl.decls
                    .iter()
                    .flat_map(|d| collect_identifiers(&d.name))
                    .map(|name| (name, kind))
                    .collect()
            }
            _ => Vec::new(),
        };
        let wrapped = !header.is_empty();
        if wrapped {
            self.writer.write_char('{');
            self.writer.write_line();
            self.writer.increase_indent();
            let mut frame = ScopeFrame::new(true);
            for (name, kind) in &header {
                frame.declare(name, *kind);
            }
            self.scopes.push(frame);
            self.emit_scope_declares();
        }

        for label in labels {
            self.writer.write(label);
            self.writer.write(": ");
        }
        self.writer.write("for (");
        match &stmt.init {
            Some(ForInit::VarDecl(decl)) => self.emit_var_decl(decl)?,
            Some(ForInit::Expr(expr)) => self.emit_expr(expr)?,
            None => {}
        }
        self.writer.write("; ");
        if let Some(test) = &stmt.test {
            self.emit_condition("for", test)?;
        }
        self.writer.write("; ");
        if let Some(update) = &stmt.update {
            self.emit_expr(update)?;
        }
        self.writer.write(") ");
        self.emit_braced(&stmt.body, &header)?;
        self.writer.write_line();

        if wrapped {
            self.scopes.pop();
            self.writer.decrease_indent();
            self.writer.write_char('}');
            self.writer.write_line();
        }
        Ok(())
    }

    /// `for-in`/`for-of`: the iteration value lands in the runtime scratch
    /// slot, and the user's binding is assigned from it at the top of the
    /// body through the ordinary write machinery, so the write hook fires
    /// each iteration. Lexical forms re-declare per iteration.
    fn emit_for_in_of(
        &mut self,
        left: &ForHead,
        right: &Expr,
        body: &Stmt,
        is_in: bool,
    ) -> Result<(), TransformError> {
        self.writer.write("for (");
        self.writer.write(TEMP_VALUE);
        self.writer.write(if is_in { " in " } else { " of " });
        let o_id = self.new_id(right.loc());
        self.hook_open(Hook::ForInObject, o_id);
        self.arg_sep();
        self.emit_expr(right)?;
        self.arg_sep();
        self.write_bool(is_in);
        self.hook_close();
        self.writer.write(") {");
        self.writer.write_line();
        self.writer.increase_indent();

        // One frame serves the loop bindings and the body's lexicals.
        let mut frame = ScopeFrame::new(true);
        if let ForHead::VarDecl(decl) = left {
            if decl.kind.is_lexical() {
                for declarator in &decl.decls {
                    for name in collect_identifiers(&declarator.name) {
                        frame.declare(&name, VarKind::from(decl.kind));
                    }
                }
            }
        }
        if let Stmt::Block(block) = body {
            scope::lexical_pass(&block.body, &mut frame);
        }
        self.scopes.push(frame);
        self.emit_scope_declares();

        match left {
            ForHead::VarDecl(decl) => {
                let declarator = &decl.decls[0];
                let names = collect_identifiers(&declarator.name);
                self.writer.write(decl.kind.as_str());
                self.writer.write_space();
                self.emit_pat(&declarator.name)?;
                self.writer.write(" = ");
                let w_id = self.new_id(declarator.loc);
                self.hook_open(Hook::Write, w_id);
                self.arg_sep();
                self.write_name_list(&names);
                self.arg_sep();
                self.writer.write(TEMP_VALUE);
                self.hook_close();
                self.end_stmt();
            }
            ForHead::Target(AssignTarget::Ident(ident)) => {
                self.with_lhs(|s| s.emit_ident(ident))?;
                self.writer.write(" = ");
                let w_id = self.new_id(ident.loc);
                self.hook_open(Hook::Write, w_id);
                self.arg_sep();
                self.write_name_list(std::slice::from_ref(&ident.name));
                self.arg_sep();
                self.writer.write(TEMP_VALUE);
                self.hook_close();
                self.end_stmt();
            }
            ForHead::Target(AssignTarget::Member(member)) => {
                let p_id = self.new_id(member.loc);
                self.hook_open(Hook::PutField, p_id);
                self.arg_sep();
                self.emit_expr(&member.obj)?;
                self.arg_sep();
                self.emit_member_prop(&member.prop)?;
                self.arg_sep();
                self.writer.write(TEMP_VALUE);
                self.hook_close();
                self.end_stmt();
            }
        }

        match body {
            Stmt::Block(block) => {
                for stmt in &block.body {
                    self.emit_stmt(stmt)?;
                }
            }
            other => self.emit_stmt(other)?,
        }
        self.scopes.pop();
        self.writer.decrease_indent();
        self.writer.write_char('}');
        self.writer.write_line();
        Ok(())
    }

    /// The discriminant is stored through `Swl`; each case test goes
    /// through `Swr`, which compares against the stored discriminant (a
    /// stack on the runtime side keeps nested switches sound). Lexical
    /// declarations in the switch body get a synthesized wrapper block for
    /// their declare hooks.
    fn emit_switch(&mut self, stmt: &SwitchStmt) -> Result<(), TransformError> {
        let mut frame = ScopeFrame::new(true);
        for case in &stmt.cases {
            scope::lexical_pass(&case.body, &mut frame);
        }
        let wrapped = !frame.is_empty();
        self.scopes.push(frame);
        if wrapped {
            self.writer.write_char('{');
            self.writer.write_line();
            self.writer.increase_indent();
            self.emit_scope_declares();
        }

        self.writer.write("switch (");
        let swl_id = self.new_id(stmt.disc.loc());
        self.hook_open(Hook::SwitchLeft, swl_id);
        self.arg_sep();
        self.emit_expr_hook(&stmt.disc)?;
        self.hook_close();
        self.writer.write(") {");
        self.writer.write_line();
        self.writer.increase_indent();

        for case in &stmt.cases {
            match &case.test {
                Some(test) => {
                    self.writer.write("case ");
                    let swr_id = self.new_id(test.loc());
                    self.hook_open(Hook::SwitchRight, swr_id);
                    self.arg_sep();
                    self.emit_expr_hook(test)?;
                    self.hook_close();
                    self.writer.write_char(':');
                }
                None => self.writer.write("default:"),
            }
            self.writer.write_line();
            self.writer.increase_indent();
            for stmt in &case.body {
                self.emit_stmt(stmt)?;
            }
            self.writer.decrease_indent();
        }

        self.writer.decrease_indent();
        self.writer.write_char('}');
        if wrapped {
            self.writer.write_line();
            self.writer.decrease_indent();
            self.writer.write_char('}');
        }
        self.writer.write_line();
        self.scopes.pop();
        Ok(())
    }

    /// The try body is walked unchanged; the catch clause owns a frame with
    /// its parameter names, declared before the catch body runs.
    fn emit_try(&mut self, stmt: &TryStmt) -> Result<(), TransformError> {
        self.writer.write("try ");
        self.emit_block(&stmt.block, &[])?;
        if let Some(handler) = &stmt.handler {
            self.writer.write(" catch ");
            let mut frame = ScopeFrame::new(true);
            if let Some(param) = &handler.param {
                for name in collect_identifiers(param) {
                    frame.declare(&name, VarKind::CatchParam);
                }
                self.writer.write_char('(');
                self.emit_pat(param)?;
                self.writer.write(") ");
            }
            scope::lexical_pass(&handler.body.body, &mut frame);
            self.writer.write_char('{');
            self.writer.write_line();
            self.writer.increase_indent();
            self.scopes.push(frame);
            self.emit_scope_declares();
            for stmt in &handler.body.body {
                self.emit_stmt(stmt)?;
            }
            self.scopes.pop();
            self.writer.decrease_indent();
            self.writer.write_char('}');
        }
        if let Some(finalizer) = &stmt.finalizer {
            self.writer.write(" finally ");
            self.emit_block(finalizer, &[])?;
        }
        self.writer.write_line();
        Ok(())
    }

    fn emit_return(&mut self, stmt: &ReturnStmt) -> Result<(), TransformError> {
        self.writer.write("return ");
        let re_id = self.new_id(stmt.loc);
        self.hook_open(Hook::Return, re_id);
        self.arg_sep();
        match &stmt.arg {
            Some(arg) => self.emit_expr_hook(arg)?,
            None => self.writer.write("undefined"),
        }
        self.hook_close();
        self.end_stmt();
        Ok(())
    }

    fn emit_throw(&mut self, stmt: &ThrowStmt) -> Result<(), TransformError> {
        self.writer.write("throw ");
        let th_id = self.new_id(stmt.loc);
        self.hook_open(Hook::Throw, th_id);
        self.arg_sep();
        self.emit_expr_hook(&stmt.arg)?;
        self.hook_close();
        self.end_stmt();
        Ok(())
    }
}
