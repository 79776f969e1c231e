//! Scope analysis: frames, and the hoisted/lexical pre-passes.
//!
//! A frame is created when entering a region (program, function body,
//! block, catch clause, for-header with lexical bindings, switch body).
//! Hoisted names (`var`, function declarations) attach to function/program
//! frames; lexical names (`let`/`const`) attach to the frame of the region
//! that declares them.
//!
//! Both passes are single-level: they look at a region's immediate
//! statements only and stop at nested function forms, which own their own
//! region. The hoisted pass additionally does not descend into
//! block-scoped containers - a block runs no hoisted pass of its own, so a
//! `var` nested in a block produces no declare event (the host still
//! hoists it, and writes to it still fire).

use rustc_hash::FxHashMap;

use crate::parser::ast::{Stmt, VarDeclKind};

use super::patterns::collect_identifiers;

/// How a name was introduced. TDZ applies precisely to `Let` and `Const`:
/// their declare hooks are emitted without a value argument at scope entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
    Func,
    Param,
    CatchParam,
    Arguments,
}

impl VarKind {
    /// The kind string carried in declare hook calls.
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
            VarKind::Func => "function",
            VarKind::Param => "param",
            VarKind::CatchParam => "catch-param",
            VarKind::Arguments => "arguments",
        }
    }

    /// Lexical kinds are in the TDZ at scope entry; their declare hooks
    /// carry no value.
    pub fn is_lexical(self) -> bool {
        matches!(self, VarKind::Let | VarKind::Const)
    }
}

impl From<VarDeclKind> for VarKind {
    fn from(kind: VarDeclKind) -> Self {
        match kind {
            VarDeclKind::Var => VarKind::Var,
            VarDeclKind::Let => VarKind::Let,
            VarDeclKind::Const => VarKind::Const,
        }
    }
}

/// One scope frame: the names a region introduces, in insertion order.
#[derive(Debug)]
pub struct ScopeFrame {
    names: Vec<(String, VarKind)>,
    index: FxHashMap<String, usize>,
    lexical: bool,
}

impl ScopeFrame {
    /// `lexical` marks block-created frames; function/program frames own
    /// hoisted names as well.
    pub fn new(lexical: bool) -> Self {
        ScopeFrame {
            names: Vec::new(),
            index: FxHashMap::default(),
            lexical,
        }
    }

    pub fn is_lexical(&self) -> bool {
        self.lexical
    }

    pub fn declare(&mut self, name: &str, kind: VarKind) {
        if let Some(&i) = self.index.get(name) {
            // `var f; function f() {}` - the function declaration wins.
            if kind == VarKind::Func {
                self.names[i].1 = kind;
            }
            return;
        }
        self.index.insert(name.to_string(), self.names.len());
        self.names.push((name.to_string(), kind));
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[(String, VarKind)] {
        &self.names
    }
}

/// The frame stack owned by the transformer state: push on region entry,
/// pop on exit.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: ScopeFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<ScopeFrame> {
        self.frames.pop()
    }

    pub fn current(&self) -> &ScopeFrame {
        self.frames.last().expect("scope stack is never empty mid-walk")
    }
}

/// Hoisted pass: collect `var` declarator names and function declaration
/// names from a region's immediate statements. Runs for program and
/// function-body regions only.
pub fn hoisted_pass(stmts: &[Stmt], frame: &mut ScopeFrame) {
    for stmt in stmts {
        match stmt {
            Stmt::VarDecl(decl) if decl.kind == VarDeclKind::Var => {
                for declarator in &decl.decls {
                    for name in collect_identifiers(&declarator.name) {
                        frame.declare(&name, VarKind::Var);
                    }
                }
            }
            Stmt::FnDecl(func) => {
                if let Some(name) = &func.name {
                    frame.declare(&name.name, VarKind::Func);
                }
            }
            _ => {}
        }
    }
}

/// Lexical pass: collect `let`/`const` declarator names from a region's
/// immediate statements.
pub fn lexical_pass(stmts: &[Stmt], frame: &mut ScopeFrame) {
    for stmt in stmts {
        if let Stmt::VarDecl(decl) = stmt {
            if decl.kind.is_lexical() {
                for declarator in &decl.decls {
                    for name in collect_identifiers(&declarator.name) {
                        frame.declare(&name, VarKind::from(decl.kind));
                    }
                }
            }
        }
    }
}
