//! AST node definitions for the supported JavaScript subset.
//!
//! Every node carries a [`Loc`] (1-based lines, 0-based columns) taken from
//! the scanner. The transformer dispatches on these variants statically; the
//! kind table is finite and closed, so constructs outside the subset never
//! reach the walker - the parser rejects them first.
//!
//! Literals keep their raw source text so they can be re-emitted exactly as
//! written (`0x1f` stays `0x1f`, `'a'` keeps its quote style).

use crate::scanner::Position;

/// Source extent of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Loc {
    pub start: Position,
    pub end: Position,
}

/// Root node of a parsed file.
#[derive(Clone, Debug)]
pub struct Program {
    pub loc: Loc,
    pub body: Vec<Stmt>,
}

/// An identifier (binding, reference, label, or property name).
#[derive(Clone, Debug)]
pub struct Ident {
    pub loc: Loc,
    pub name: String,
}

// =============================================================================
// Literals
// =============================================================================

/// Literal kind, with the wire type code reported to the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LitKind {
    Str,
    Bool,
    Null,
    Num,
    Regex,
    BigInt,
}

impl LitKind {
    /// Type code carried in the literal hook: string=0, boolean=1, null=2,
    /// number=3, regexp=4, bigint=5.
    pub fn type_code(self) -> u8 {
        match self {
            LitKind::Str => 0,
            LitKind::Bool => 1,
            LitKind::Null => 2,
            LitKind::Num => 3,
            LitKind::Regex => 4,
            LitKind::BigInt => 5,
        }
    }
}

/// A primitive literal, kept as raw source text.
#[derive(Clone, Debug)]
pub struct Lit {
    pub loc: Loc,
    pub raw: String,
    pub kind: LitKind,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Debug)]
pub enum Expr {
    Ident(Ident),
    Lit(Lit),
    Array(ArrayLit),
    Object(ObjectLit),
    Function(Box<Function>),
    Arrow(Box<ArrowFunction>),
    Unary(Box<UnaryExpr>),
    Update(Box<UpdateExpr>),
    Binary(Box<BinaryExpr>),
    Logical(Box<LogicalExpr>),
    Assign(Box<AssignExpr>),
    Cond(Box<CondExpr>),
    Call(Box<CallExpr>),
    New(Box<NewExpr>),
    Member(Box<MemberExpr>),
    Seq(Box<SeqExpr>),
    This(Loc),
}

impl Expr {
    pub fn loc(&self) -> Loc {
        match self {
            Expr::Ident(e) => e.loc,
            Expr::Lit(e) => e.loc,
            Expr::Array(e) => e.loc,
            Expr::Object(e) => e.loc,
            Expr::Function(e) => e.loc,
            Expr::Arrow(e) => e.loc,
            Expr::Unary(e) => e.loc,
            Expr::Update(e) => e.loc,
            Expr::Binary(e) => e.loc,
            Expr::Logical(e) => e.loc,
            Expr::Assign(e) => e.loc,
            Expr::Cond(e) => e.loc,
            Expr::Call(e) => e.loc,
            Expr::New(e) => e.loc,
            Expr::Member(e) => e.loc,
            Expr::Seq(e) => e.loc,
            Expr::This(loc) => *loc,
        }
    }
}

/// `[a, , b]` - holes are `None`.
#[derive(Clone, Debug)]
pub struct ArrayLit {
    pub loc: Loc,
    pub elems: Vec<Option<Expr>>,
}

#[derive(Clone, Debug)]
pub struct ObjectLit {
    pub loc: Loc,
    pub props: Vec<ObjectProp>,
}

#[derive(Clone, Debug)]
pub struct ObjectProp {
    pub loc: Loc,
    pub key: PropKey,
    pub value: Expr,
    pub shorthand: bool,
}

/// A non-computed property key.
#[derive(Clone, Debug)]
pub enum PropKey {
    Ident(Ident),
    Str(Lit),
    Num(Lit),
}

/// A `function` declaration or expression. Declarations always have a name.
#[derive(Clone, Debug)]
pub struct Function {
    pub loc: Loc,
    pub name: Option<Ident>,
    pub params: Vec<Pat>,
    pub body: BlockStmt,
    pub is_async: bool,
    pub is_generator: bool,
}

#[derive(Clone, Debug)]
pub struct ArrowFunction {
    pub loc: Loc,
    pub params: Vec<Pat>,
    pub body: ArrowBody,
    pub is_async: bool,
}

#[derive(Clone, Debug)]
pub enum ArrowBody {
    Block(BlockStmt),
    Expr(Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

#[derive(Clone, Debug)]
pub struct UnaryExpr {
    pub loc: Loc,
    pub op: UnaryOp,
    pub arg: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

impl UpdateOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOp::Inc => "++",
            UpdateOp::Dec => "--",
        }
    }
}

#[derive(Clone, Debug)]
pub struct UpdateExpr {
    pub loc: Loc,
    pub op: UpdateOp,
    pub prefix: bool,
    pub arg: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Exp,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    In,
    Instanceof,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Exp => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNotEq => "!==",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::In => "in",
            BinOp::Instanceof => "instanceof",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BinaryExpr {
    pub loc: Loc,
    pub op: BinOp,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

impl LogicalOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Nullish => "??",
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogicalExpr {
    pub loc: Loc,
    pub op: LogicalOp,
    pub left: Expr,
    pub right: Expr,
}

/// Assignment operator. Compound forms expand to a plain write of a
/// synthesized binary over a read of the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Exp,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
}

impl AssignOp {
    /// The binary operator a compound assignment expands to; `None` for
    /// plain `=`.
    pub fn binary_op(self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Div => Some(BinOp::Div),
            AssignOp::Rem => Some(BinOp::Rem),
            AssignOp::Exp => Some(BinOp::Exp),
            AssignOp::Shl => Some(BinOp::Shl),
            AssignOp::Shr => Some(BinOp::Shr),
            AssignOp::UShr => Some(BinOp::UShr),
            AssignOp::BitAnd => Some(BinOp::BitAnd),
            AssignOp::BitOr => Some(BinOp::BitOr),
            AssignOp::BitXor => Some(BinOp::BitXor),
        }
    }
}

/// The target of an assignment or of a `for-in`/`for-of` head. Destructuring
/// targets outside declarations are rejected by the parser.
#[derive(Clone, Debug)]
pub enum AssignTarget {
    Ident(Ident),
    Member(Box<MemberExpr>),
}

#[derive(Clone, Debug)]
pub struct AssignExpr {
    pub loc: Loc,
    pub op: AssignOp,
    pub target: AssignTarget,
    pub value: Expr,
}

#[derive(Clone, Debug)]
pub struct CondExpr {
    pub loc: Loc,
    pub test: Expr,
    pub cons: Expr,
    pub alt: Expr,
}

#[derive(Clone, Debug)]
pub struct CallExpr {
    pub loc: Loc,
    pub callee: Expr,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug)]
pub struct NewExpr {
    pub loc: Loc,
    pub callee: Expr,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug)]
pub struct MemberExpr {
    pub loc: Loc,
    pub obj: Expr,
    pub prop: MemberProp,
}

/// `.name` or `[expr]`.
#[derive(Clone, Debug)]
pub enum MemberProp {
    Ident(Ident),
    Computed(Expr),
}

/// Comma expression.
#[derive(Clone, Debug)]
pub struct SeqExpr {
    pub loc: Loc,
    pub exprs: Vec<Expr>,
}

// =============================================================================
// Binding patterns
// =============================================================================

/// A binding pattern position (declarations, parameters, catch params).
#[derive(Clone, Debug)]
pub enum Pat {
    Ident(Ident),
    Array(ArrayPat),
    Object(ObjectPat),
    Assign(Box<AssignPat>),
    Rest(Box<RestPat>),
}

impl Pat {
    pub fn loc(&self) -> Loc {
        match self {
            Pat::Ident(p) => p.loc,
            Pat::Array(p) => p.loc,
            Pat::Object(p) => p.loc,
            Pat::Assign(p) => p.loc,
            Pat::Rest(p) => p.loc,
        }
    }
}

/// `[a, , b, ...rest]` - holes are `None`, rest is a trailing `Pat::Rest`.
#[derive(Clone, Debug)]
pub struct ArrayPat {
    pub loc: Loc,
    pub elems: Vec<Option<Pat>>,
}

#[derive(Clone, Debug)]
pub struct ObjectPat {
    pub loc: Loc,
    pub props: Vec<ObjectPatProp>,
}

#[derive(Clone, Debug)]
pub enum ObjectPatProp {
    KeyValue {
        loc: Loc,
        key: PropKey,
        value: Pat,
        shorthand: bool,
    },
    Rest(RestPat),
}

/// `x = default`.
#[derive(Clone, Debug)]
pub struct AssignPat {
    pub loc: Loc,
    pub left: Pat,
    pub right: Expr,
}

/// `...x`.
#[derive(Clone, Debug)]
pub struct RestPat {
    pub loc: Loc,
    pub arg: Pat,
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Clone, Debug)]
pub enum Stmt {
    Block(BlockStmt),
    VarDecl(VarDecl),
    FnDecl(Box<Function>),
    Expr(ExprStmt),
    If(Box<IfStmt>),
    While(Box<WhileStmt>),
    DoWhile(Box<DoWhileStmt>),
    For(Box<ForStmt>),
    ForIn(Box<ForInStmt>),
    ForOf(Box<ForOfStmt>),
    Switch(Box<SwitchStmt>),
    Try(Box<TryStmt>),
    Return(ReturnStmt),
    Throw(ThrowStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Labeled(Box<LabeledStmt>),
    Debugger(Loc),
    Empty(Loc),
}

#[derive(Clone, Debug)]
pub struct BlockStmt {
    pub loc: Loc,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarDeclKind {
    Var,
    Let,
    Const,
}

impl VarDeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarDeclKind::Var => "var",
            VarDeclKind::Let => "let",
            VarDeclKind::Const => "const",
        }
    }

    /// `let`/`const` bindings are lexical and subject to the TDZ.
    pub fn is_lexical(self) -> bool {
        !matches!(self, VarDeclKind::Var)
    }
}

#[derive(Clone, Debug)]
pub struct VarDecl {
    pub loc: Loc,
    pub kind: VarDeclKind,
    pub decls: Vec<VarDeclarator>,
}

#[derive(Clone, Debug)]
pub struct VarDeclarator {
    pub loc: Loc,
    pub name: Pat,
    pub init: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct ExprStmt {
    pub loc: Loc,
    pub expr: Expr,
}

#[derive(Clone, Debug)]
pub struct IfStmt {
    pub loc: Loc,
    pub test: Expr,
    pub cons: Stmt,
    pub alt: Option<Stmt>,
}

#[derive(Clone, Debug)]
pub struct WhileStmt {
    pub loc: Loc,
    pub test: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug)]
pub struct DoWhileStmt {
    pub loc: Loc,
    pub body: Stmt,
    pub test: Expr,
}

#[derive(Clone, Debug)]
pub struct ForStmt {
    pub loc: Loc,
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Stmt,
}

#[derive(Clone, Debug)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expr(Expr),
}

/// The binding position of a `for-in`/`for-of` head.
#[derive(Clone, Debug)]
pub enum ForHead {
    VarDecl(VarDecl),
    Target(AssignTarget),
}

#[derive(Clone, Debug)]
pub struct ForInStmt {
    pub loc: Loc,
    pub left: ForHead,
    pub right: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug)]
pub struct ForOfStmt {
    pub loc: Loc,
    pub left: ForHead,
    pub right: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug)]
pub struct SwitchStmt {
    pub loc: Loc,
    pub disc: Expr,
    pub cases: Vec<SwitchCase>,
}

/// `case test:` or `default:` (no test).
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub loc: Loc,
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct TryStmt {
    pub loc: Loc,
    pub block: BlockStmt,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStmt>,
}

/// `catch (param) { ... }` - the param is optional (ES2019 bare catch).
#[derive(Clone, Debug)]
pub struct CatchClause {
    pub loc: Loc,
    pub param: Option<Pat>,
    pub body: BlockStmt,
}

#[derive(Clone, Debug)]
pub struct ReturnStmt {
    pub loc: Loc,
    pub arg: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct ThrowStmt {
    pub loc: Loc,
    pub arg: Expr,
}

#[derive(Clone, Debug)]
pub struct BreakStmt {
    pub loc: Loc,
    pub label: Option<Ident>,
}

#[derive(Clone, Debug)]
pub struct ContinueStmt {
    pub loc: Loc,
    pub label: Option<Ident>,
}

#[derive(Clone, Debug)]
pub struct LabeledStmt {
    pub loc: Loc,
    pub label: Ident,
    pub body: Stmt,
}
