//! Expression handlers.
//!
//! Every handler writes a fragment whose evaluation yields the original
//! value. Pre/post hook pairs live on the runtime side: the emitted call
//! passes evaluated operands and the runtime brackets the computation. The
//! base object of member update and compound-assignment targets is
//! memoized in a runtime scratch slot so it is evaluated exactly once;
//! computed property keys get a second slot.
//!
//! Emitted assignment, logical, conditional, and sequence forms are always
//! parenthesized - they are the only outputs that do not parse as primary
//! expressions, and the enclosing emitted context is not guaranteed to
//! bind looser.

use crate::diagnostics::TransformError;
use crate::parser::ast::{
    ArrayLit, AssignExpr, AssignTarget, BinaryExpr, CallExpr, CondExpr, Expr, Ident, Lit,
    LogicalExpr, MemberExpr, MemberProp, NewExpr, ObjectLit, ObjectPatProp, Pat, PropKey, SeqExpr,
    UnaryExpr, UnaryOp, UpdateExpr,
};

use super::hooks::{Hook, TEMP_PROP, TEMP_VALUE};
use super::Instrumenter;

impl Instrumenter<'_> {
    pub(super) fn emit_expr(&mut self, expr: &Expr) -> Result<(), TransformError> {
        match expr {
            Expr::Ident(ident) => self.emit_ident(ident),
            Expr::Lit(lit) => {
                self.emit_lit(lit);
                Ok(())
            }
            Expr::Array(array) => self.emit_array(array),
            Expr::Object(object) => self.emit_object(object),
            Expr::Function(func) => {
                // A function expression is itself a value; report it as a
                // literal.
                let id = self.new_id(func.loc);
                self.hook_open(Hook::Literal, id);
                self.arg_sep();
                self.emit_function(func, true)?;
                self.hook_close();
                Ok(())
            }
            Expr::Arrow(arrow) => {
                let id = self.new_id(arrow.loc);
                self.hook_open(Hook::Literal, id);
                self.arg_sep();
                self.emit_arrow(arrow)?;
                self.hook_close();
                Ok(())
            }
            Expr::This(_) => {
                self.writer.write("this");
                Ok(())
            }
            Expr::Unary(unary) => self.emit_unary(unary),
            Expr::Update(update) => self.emit_update(update),
            Expr::Binary(binary) => self.emit_binary(binary),
            Expr::Logical(logical) => self.emit_logical(logical),
            Expr::Assign(assign) => self.emit_assign(assign),
            Expr::Cond(cond) => self.emit_cond(cond),
            Expr::Call(call) => self.emit_call(call),
            Expr::New(new) => self.emit_new(new),
            Expr::Member(member) => self.emit_member(member),
            Expr::Seq(seq) => self.emit_seq(seq),
        }
    }

    /// LHS-context identifiers denote a binding target and stay bare;
    /// everything else is a read.
    pub(super) fn emit_ident(&mut self, ident: &Ident) -> Result<(), TransformError> {
        if self.in_lhs {
            self.writer.write(&ident.name);
            return Ok(());
        }
        let id = self.new_id(ident.loc);
        self.hook_open(Hook::Read, id);
        self.arg_sep();
        self.write_js_string(&ident.name);
        self.arg_sep();
        self.writer.write(&ident.name);
        self.hook_close();
        Ok(())
    }

    fn emit_lit(&mut self, lit: &Lit) {
        let id = self.new_id(lit.loc);
        self.hook_open(Hook::Literal, id);
        self.arg_sep();
        self.writer.write(&lit.raw);
        self.arg_sep();
        self.writer.write_u32(lit.kind.type_code() as u32);
        self.hook_close();
    }

    fn emit_array(&mut self, array: &ArrayLit) -> Result<(), TransformError> {
        let id = self.new_id(array.loc);
        self.hook_open(Hook::Literal, id);
        self.arg_sep();
        self.writer.write_char('[');
        let last = array.elems.len().saturating_sub(1);
        for (i, elem) in array.elems.iter().enumerate() {
            if let Some(expr) = elem {
                self.emit_expr(expr)?;
            }
            // A hole needs its comma even in last position to keep the
            // array's length.
            if i < last || elem.is_none() {
                self.arg_sep();
            }
        }
        self.writer.write_char(']');
        self.hook_close();
        Ok(())
    }

    fn emit_object(&mut self, object: &ObjectLit) -> Result<(), TransformError> {
        let id = self.new_id(object.loc);
        self.hook_open(Hook::Literal, id);
        self.arg_sep();
        if object.props.is_empty() {
            self.writer.write("{}");
        } else {
            self.writer.write("{ ");
            for (i, prop) in object.props.iter().enumerate() {
                if i > 0 {
                    self.arg_sep();
                }
                // Shorthand expands: the value identifier is a read like
                // any other.
                self.emit_prop_key(&prop.key);
                self.writer.write(": ");
                self.emit_expr(&prop.value)?;
            }
            self.writer.write(" }");
        }
        self.hook_close();
        Ok(())
    }

    pub(super) fn emit_prop_key(&mut self, key: &PropKey) {
        match key {
            PropKey::Ident(ident) => self.writer.write(&ident.name),
            PropKey::Str(lit) | PropKey::Num(lit) => self.writer.write(&lit.raw),
        }
    }

    fn emit_unary(&mut self, unary: &UnaryExpr) -> Result<(), TransformError> {
        if unary.op == UnaryOp::Delete {
            // Only the member form has a hook shape; the runtime performs
            // the deletion and reports it.
            let Expr::Member(member) = &unary.arg else {
                return Err(TransformError::unsupported(
                    self.file,
                    unary.loc.start,
                    "delete of a non-member expression",
                ));
            };
            let id = self.new_id(unary.loc);
            self.hook_open(Hook::Delete, id);
            self.arg_sep();
            self.emit_expr(&member.obj)?;
            self.arg_sep();
            self.emit_member_prop(&member.prop)?;
            self.hook_close();
            return Ok(());
        }

        let id = self.new_id(unary.loc);
        self.hook_open(Hook::Unary, id);
        self.arg_sep();
        self.write_quoted(unary.op.as_str());
        self.arg_sep();
        self.emit_expr(&unary.arg)?;
        self.hook_close();
        Ok(())
    }

    fn emit_binary(&mut self, binary: &BinaryExpr) -> Result<(), TransformError> {
        let id = self.new_id(binary.loc);
        self.hook_open(Hook::Binary, id);
        self.arg_sep();
        self.write_quoted(binary.op.as_str());
        self.arg_sep();
        self.emit_expr(&binary.left)?;
        self.arg_sep();
        self.emit_expr(&binary.right)?;
        self.hook_close();
        Ok(())
    }

    /// `C(id, "op", left) op right` - the host's own short-circuit decides
    /// whether the right side evaluates.
    fn emit_logical(&mut self, logical: &LogicalExpr) -> Result<(), TransformError> {
        self.writer.write_char('(');
        let id = self.new_id(logical.loc);
        self.hook_open(Hook::Condition, id);
        self.arg_sep();
        self.write_quoted(logical.op.as_str());
        self.arg_sep();
        self.emit_expr(&logical.left)?;
        self.hook_close();
        self.writer.write_char(' ');
        self.writer.write(logical.op.as_str());
        self.writer.write_char(' ');
        self.emit_expr(&logical.right)?;
        self.writer.write_char(')');
        Ok(())
    }

    fn emit_cond(&mut self, cond: &CondExpr) -> Result<(), TransformError> {
        self.writer.write_char('(');
        let id = self.new_id(cond.test.loc());
        self.hook_open(Hook::Condition, id);
        self.arg_sep();
        self.write_quoted("?");
        self.arg_sep();
        self.emit_expr(&cond.test)?;
        self.hook_close();
        self.writer.write(" ? ");
        self.emit_expr(&cond.cons)?;
        self.writer.write(" : ");
        self.emit_expr(&cond.alt)?;
        self.writer.write_char(')');
        Ok(())
    }

    fn emit_seq(&mut self, seq: &SeqExpr) -> Result<(), TransformError> {
        self.writer.write_char('(');
        for (i, expr) in seq.exprs.iter().enumerate() {
            if i > 0 {
                self.arg_sep();
            }
            self.emit_expr(expr)?;
        }
        self.writer.write_char(')');
        Ok(())
    }

    fn emit_member(&mut self, member: &MemberExpr) -> Result<(), TransformError> {
        let id = self.new_id(member.loc);
        self.hook_open(Hook::GetField, id);
        self.arg_sep();
        self.emit_expr(&member.obj)?;
        self.arg_sep();
        self.emit_member_prop(&member.prop)?;
        self.hook_close();
        Ok(())
    }

    pub(super) fn emit_member_prop(&mut self, prop: &MemberProp) -> Result<(), TransformError> {
        match prop {
            MemberProp::Ident(ident) => {
                self.write_js_string(&ident.name);
                Ok(())
            }
            MemberProp::Computed(expr) => self.emit_expr(expr),
        }
    }

    /// The memoized property argument of a member update/compound target:
    /// a string literal for `.name`, the scratch slot for a computed key.
    fn write_memoized_prop(&mut self, prop: &MemberProp) {
        match prop {
            MemberProp::Ident(ident) => self.write_js_string(&ident.name),
            MemberProp::Computed(_) => self.writer.write(TEMP_PROP),
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn emit_call(&mut self, call: &CallExpr) -> Result<(), TransformError> {
        self.emit_callee(call.loc, &call.callee, false)?;
        self.emit_args(&call.args)
    }

    fn emit_new(&mut self, new: &NewExpr) -> Result<(), TransformError> {
        self.emit_callee(new.loc, &new.callee, true)?;
        self.emit_args(&new.args)
    }

    /// Build the call wrapper. A member callee goes through `M`, which
    /// captures the base so `this` identity is preserved; everything else
    /// goes through `F`. Constructor calls set the ctor flag and the
    /// wrapper constructs reflectively.
    fn emit_callee(
        &mut self,
        loc: crate::parser::ast::Loc,
        callee: &Expr,
        is_ctor: bool,
    ) -> Result<(), TransformError> {
        if let Expr::Member(member) = callee {
            let id = self.new_id(loc);
            self.hook_open(Hook::MethodWrapper, id);
            self.arg_sep();
            self.emit_expr(&member.obj)?;
            self.arg_sep();
            self.emit_member_prop(&member.prop)?;
            self.arg_sep();
            self.write_bool(is_ctor);
            self.hook_close();
        } else {
            let id = self.new_id(loc);
            self.hook_open(Hook::FunWrapper, id);
            self.arg_sep();
            self.emit_expr(callee)?;
            self.arg_sep();
            self.write_bool(is_ctor);
            self.hook_close();
        }
        Ok(())
    }

    fn emit_args(&mut self, args: &[Expr]) -> Result<(), TransformError> {
        self.writer.write_char('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.arg_sep();
            }
            self.emit_expr(arg)?;
        }
        self.writer.write_char(')');
        Ok(())
    }

    // =========================================================================
    // Assignment and update
    // =========================================================================

    fn emit_assign(&mut self, assign: &AssignExpr) -> Result<(), TransformError> {
        self.writer.write_char('(');
        match (&assign.target, assign.op.binary_op()) {
            // x = W(id, ["x"], E(id2, value))
            (AssignTarget::Ident(ident), None) => {
                self.with_lhs(|s| s.emit_ident(ident))?;
                self.writer.write(" = ");
                let w_id = self.new_id(assign.loc);
                self.hook_open(Hook::Write, w_id);
                self.arg_sep();
                self.write_name_list(std::slice::from_ref(&ident.name));
                self.arg_sep();
                self.emit_expr_hook(&assign.value)?;
                self.hook_close();
            }
            // P(id, base, prop, E(id2, value)) - the runtime performs the
            // put and returns the value.
            (AssignTarget::Member(member), None) => {
                let p_id = self.new_id(assign.loc);
                self.hook_open(Hook::PutField, p_id);
                self.arg_sep();
                self.emit_expr(&member.obj)?;
                self.arg_sep();
                self.emit_member_prop(&member.prop)?;
                self.arg_sep();
                self.emit_expr_hook(&assign.value)?;
                self.hook_close();
            }
            // x op= v expands to x = W(id, ["x"], E(e, B(b, "op", R(r, "x", x), v)))
            (AssignTarget::Ident(ident), Some(bin_op)) => {
                self.with_lhs(|s| s.emit_ident(ident))?;
                self.writer.write(" = ");
                let w_id = self.new_id(assign.loc);
                self.hook_open(Hook::Write, w_id);
                self.arg_sep();
                self.write_name_list(std::slice::from_ref(&ident.name));
                self.arg_sep();
                let e_id = self.new_id(assign.value.loc());
                self.hook_open(Hook::Expr, e_id);
                self.arg_sep();
                let b_id = self.synth_id();
                self.hook_open(Hook::Binary, b_id);
                self.arg_sep();
                self.write_quoted(bin_op.as_str());
                self.arg_sep();
                self.emit_ident(ident)?;
                self.arg_sep();
                self.emit_expr(&assign.value)?;
                self.hook_close(); // B
                self.hook_close(); // E
                self.hook_close(); // W
            }
            // base.p op= v memoizes the base (and a computed key) so each
            // evaluates exactly once.
            (AssignTarget::Member(member), Some(bin_op)) => {
                self.writer.write(TEMP_VALUE);
                self.writer.write(" = ");
                self.emit_expr(&member.obj)?;
                self.arg_sep();
                if let MemberProp::Computed(key) = &member.prop {
                    self.writer.write(TEMP_PROP);
                    self.writer.write(" = ");
                    self.emit_expr(key)?;
                    self.arg_sep();
                }
                let p_id = self.new_id(assign.loc);
                self.hook_open(Hook::PutField, p_id);
                self.arg_sep();
                self.writer.write(TEMP_VALUE);
                self.arg_sep();
                self.write_memoized_prop(&member.prop);
                self.arg_sep();
                let e_id = self.new_id(assign.value.loc());
                self.hook_open(Hook::Expr, e_id);
                self.arg_sep();
                let b_id = self.synth_id();
                self.hook_open(Hook::Binary, b_id);
                self.arg_sep();
                self.write_quoted(bin_op.as_str());
                self.arg_sep();
                let g_id = self.new_id(member.loc);
                self.hook_open(Hook::GetField, g_id);
                self.arg_sep();
                self.writer.write(TEMP_VALUE);
                self.arg_sep();
                self.write_memoized_prop(&member.prop);
                self.hook_close(); // G
                self.arg_sep();
                self.emit_expr(&assign.value)?;
                self.hook_close(); // B
                self.hook_close(); // E
                self.hook_close(); // P
            }
        }
        self.writer.write_char(')');
        Ok(())
    }

    /// `Up(id, binId, "op", prefix, arg, writer)`: the runtime coerces the
    /// old value, reports the synthesized binary under `binId`, pushes the
    /// new value through the writer closure, and yields old or new per the
    /// prefix flag. The writer performs the original target update through
    /// the ordinary write machinery.
    fn emit_update(&mut self, update: &UpdateExpr) -> Result<(), TransformError> {
        match &update.arg {
            Expr::Ident(ident) => {
                let up_id = self.new_id(update.loc);
                self.hook_open(Hook::Update, up_id);
                self.arg_sep();
                let bin_id = self.synth_id();
                self.writer.write_u32(bin_id);
                self.arg_sep();
                self.write_quoted(update.op.as_str());
                self.arg_sep();
                self.write_bool(update.prefix);
                self.arg_sep();
                self.emit_ident(ident)?;
                self.arg_sep();
                self.writer.write("(v) => (");
                self.with_lhs(|s| s.emit_ident(ident))?;
                self.writer.write(" = ");
                let w_id = self.new_id(ident.loc);
                self.hook_open(Hook::Write, w_id);
                self.arg_sep();
                self.write_name_list(std::slice::from_ref(&ident.name));
                self.arg_sep();
                self.writer.write("v");
                self.hook_close();
                self.writer.write_char(')');
                self.hook_close();
                Ok(())
            }
            Expr::Member(member) => {
                self.writer.write_char('(');
                self.writer.write(TEMP_VALUE);
                self.writer.write(" = ");
                self.emit_expr(&member.obj)?;
                self.arg_sep();
                if let MemberProp::Computed(key) = &member.prop {
                    self.writer.write(TEMP_PROP);
                    self.writer.write(" = ");
                    self.emit_expr(key)?;
                    self.arg_sep();
                }
                let up_id = self.new_id(update.loc);
                self.hook_open(Hook::Update, up_id);
                self.arg_sep();
                let bin_id = self.synth_id();
                self.writer.write_u32(bin_id);
                self.arg_sep();
                self.write_quoted(update.op.as_str());
                self.arg_sep();
                self.write_bool(update.prefix);
                self.arg_sep();
                let g_id = self.new_id(member.loc);
                self.hook_open(Hook::GetField, g_id);
                self.arg_sep();
                self.writer.write(TEMP_VALUE);
                self.arg_sep();
                self.write_memoized_prop(&member.prop);
                self.hook_close(); // G
                self.arg_sep();
                self.writer.write("(v) => ");
                let p_id = self.new_id(member.loc);
                self.hook_open(Hook::PutField, p_id);
                self.arg_sep();
                self.writer.write(TEMP_VALUE);
                self.arg_sep();
                self.write_memoized_prop(&member.prop);
                self.arg_sep();
                self.writer.write("v");
                self.hook_close(); // P
                self.hook_close(); // Up
                self.writer.write_char(')');
                Ok(())
            }
            other => Err(TransformError::syntax(
                self.file,
                other.loc().start,
                "invalid increment/decrement target",
            )),
        }
    }

    // =========================================================================
    // Binding patterns (LHS context)
    // =========================================================================

    /// Emit a binding pattern. Bound names are written bare (they denote
    /// targets); default expressions are walked as ordinary reads.
    pub(super) fn emit_pat(&mut self, pat: &Pat) -> Result<(), TransformError> {
        match pat {
            Pat::Ident(ident) => self.with_lhs(|s| s.emit_ident(ident)),
            Pat::Array(array) => {
                self.writer.write_char('[');
                let last = array.elems.len().saturating_sub(1);
                for (i, elem) in array.elems.iter().enumerate() {
                    if let Some(pat) = elem {
                        self.emit_pat(pat)?;
                    }
                    if i < last || elem.is_none() {
                        self.arg_sep();
                    }
                }
                self.writer.write_char(']');
                Ok(())
            }
            Pat::Object(object) => {
                self.writer.write_char('{');
                for (i, prop) in object.props.iter().enumerate() {
                    if i > 0 {
                        self.arg_sep();
                    }
                    match prop {
                        ObjectPatProp::KeyValue {
                            key,
                            value,
                            shorthand,
                            ..
                        } => {
                            if *shorthand {
                                self.emit_pat(value)?;
                            } else {
                                self.emit_prop_key(key);
                                self.writer.write(": ");
                                self.emit_pat(value)?;
                            }
                        }
                        ObjectPatProp::Rest(rest) => {
                            self.writer.write("...");
                            self.emit_pat(&rest.arg)?;
                        }
                    }
                }
                self.writer.write_char('}');
                Ok(())
            }
            Pat::Assign(assign) => {
                self.emit_pat(&assign.left)?;
                self.writer.write(" = ");
                self.with_rhs(|s| s.emit_expr(&assign.right))
            }
            Pat::Rest(rest) => {
                self.writer.write("...");
                self.emit_pat(&rest.arg)
            }
        }
    }
}
