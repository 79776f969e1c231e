//! Tests for the parser module.

use super::ast::*;
use super::parse;

fn parse_ok(src: &str) -> Program {
    parse(src, "test.js").expect("parse")
}

fn parse_err(src: &str) -> String {
    parse(src, "test.js").expect_err("expected parse failure").message
}

fn only_expr(program: &Program) -> &Expr {
    match &program.body[..] {
        [Stmt::Expr(stmt)] => &stmt.expr,
        other => panic!("expected a single expression statement, got {other:?}"),
    }
}

#[test]
fn var_decl_with_initializer() {
    let program = parse_ok("var x = 1 + 2;");
    let Stmt::VarDecl(decl) = &program.body[0] else {
        panic!("expected var decl");
    };
    assert_eq!(decl.kind, VarDeclKind::Var);
    assert_eq!(decl.decls.len(), 1);
    assert!(matches!(decl.decls[0].name, Pat::Ident(ref i) if i.name == "x"));
    assert!(matches!(
        decl.decls[0].init,
        Some(Expr::Binary(ref b)) if b.op == BinOp::Add
    ));
}

#[test]
fn precedence_mul_binds_tighter_than_add() {
    let program = parse_ok("a + b * c;");
    let Expr::Binary(add) = only_expr(&program) else {
        panic!("expected binary");
    };
    assert_eq!(add.op, BinOp::Add);
    assert!(matches!(add.right, Expr::Binary(ref m) if m.op == BinOp::Mul));
}

#[test]
fn exponent_is_right_associative() {
    let program = parse_ok("a ** b ** c;");
    let Expr::Binary(outer) = only_expr(&program) else {
        panic!("expected binary");
    };
    assert_eq!(outer.op, BinOp::Exp);
    assert!(matches!(outer.left, Expr::Ident(_)));
    assert!(matches!(outer.right, Expr::Binary(ref inner) if inner.op == BinOp::Exp));
}

#[test]
fn logical_and_binary_are_distinct_nodes() {
    let program = parse_ok("a && b | c;");
    let Expr::Logical(and) = only_expr(&program) else {
        panic!("expected logical");
    };
    assert_eq!(and.op, LogicalOp::And);
    assert!(matches!(and.right, Expr::Binary(ref b) if b.op == BinOp::BitOr));
}

#[test]
fn assignment_targets() {
    let program = parse_ok("x = 1; o.p = 2; o[k] = 3;");
    assert_eq!(program.body.len(), 3);
    for stmt in &program.body {
        let Stmt::Expr(stmt) = stmt else {
            panic!("expected expression statement")
        };
        assert!(matches!(stmt.expr, Expr::Assign(_)));
    }
}

#[test]
fn compound_assignment_operator() {
    let program = parse_ok("x += 1;");
    let Expr::Assign(assign) = only_expr(&program) else {
        panic!("expected assignment");
    };
    assert_eq!(assign.op, AssignOp::Add);
    assert_eq!(assign.op.binary_op(), Some(BinOp::Add));
}

#[test]
fn conditional_expression() {
    let program = parse_ok("a ? b : c;");
    assert!(matches!(only_expr(&program), Expr::Cond(_)));
}

#[test]
fn member_call_and_new_chains() {
    let program = parse_ok("new a.b(1).c(2)[d](3);");
    // new binds to a.b, then the result is called/indexed/called.
    let Expr::Call(outer) = only_expr(&program) else {
        panic!("expected call");
    };
    assert!(matches!(outer.callee, Expr::Member(_)));
}

#[test]
fn new_without_arguments() {
    let program = parse_ok("new F;");
    let Expr::New(new) = only_expr(&program) else {
        panic!("expected new");
    };
    assert!(new.args.is_empty());
}

#[test]
fn regex_in_expression_position() {
    let program = parse_ok("var re = /ab+c/gi;");
    let Stmt::VarDecl(decl) = &program.body[0] else {
        panic!("expected var decl");
    };
    let Some(Expr::Lit(lit)) = &decl.decls[0].init else {
        panic!("expected literal init");
    };
    assert_eq!(lit.kind, LitKind::Regex);
    assert_eq!(lit.raw, "/ab+c/gi");
}

#[test]
fn division_is_not_regex() {
    let program = parse_ok("a / b / c;");
    let Expr::Binary(outer) = only_expr(&program) else {
        panic!("expected binary");
    };
    assert_eq!(outer.op, BinOp::Div);
}

#[test]
fn arrow_functions() {
    let program = parse_ok("var f = x => x + 1; var g = (a, b) => { return a; };");
    let Stmt::VarDecl(decl) = &program.body[0] else {
        panic!()
    };
    let Some(Expr::Arrow(arrow)) = &decl.decls[0].init else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.params.len(), 1);
    assert!(matches!(arrow.body, ArrowBody::Expr(_)));

    let Stmt::VarDecl(decl) = &program.body[1] else {
        panic!()
    };
    let Some(Expr::Arrow(arrow)) = &decl.decls[0].init else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.params.len(), 2);
    assert!(matches!(arrow.body, ArrowBody::Block(_)));
}

#[test]
fn async_arrow_functions() {
    let program = parse_ok("var f = async x => x; var g = async (a, b) => { return b; };");
    for stmt in &program.body {
        let Stmt::VarDecl(decl) = stmt else { panic!() };
        let Some(Expr::Arrow(arrow)) = &decl.decls[0].init else {
            panic!("expected arrow");
        };
        assert!(arrow.is_async);
    }
}

#[test]
fn async_call_is_not_an_arrow() {
    // `async` with no arrow after the parens is an ordinary identifier.
    let program = parse_ok("async(q);");
    let Expr::Call(call) = only_expr(&program) else {
        panic!("expected call");
    };
    assert!(matches!(call.callee, Expr::Ident(ref i) if i.name == "async"));
}

#[test]
fn line_break_after_async_is_not_an_arrow_head() {
    // Restricted production: `async` followed by a line terminator stands
    // alone.
    let program = parse_ok("async\nx => x;");
    assert_eq!(program.body.len(), 2);
    assert!(matches!(&program.body[0], Stmt::Expr(stmt) if matches!(stmt.expr, Expr::Ident(_))));
}

#[test]
fn parenthesized_expression_is_not_arrow() {
    let program = parse_ok("(a + b) * c;");
    let Expr::Binary(mul) = only_expr(&program) else {
        panic!("expected binary");
    };
    assert_eq!(mul.op, BinOp::Mul);
}

#[test]
fn sequence_expression() {
    let program = parse_ok("(a, b, c);");
    let Expr::Seq(seq) = only_expr(&program) else {
        panic!("expected sequence");
    };
    assert_eq!(seq.exprs.len(), 3);
}

#[test]
fn for_in_and_for_of_heads() {
    let program = parse_ok("for (var k in o) {} for (const v of xs) {} for (x of xs) {}");
    assert!(matches!(program.body[0], Stmt::ForIn(_)));
    assert!(matches!(program.body[1], Stmt::ForOf(_)));
    let Stmt::ForOf(for_of) = &program.body[2] else {
        panic!()
    };
    assert!(matches!(for_of.left, ForHead::Target(AssignTarget::Ident(_))));
}

#[test]
fn for_head_allows_in_operator_only_in_parens() {
    // `in` inside a classic for head must not terminate the init.
    let program = parse_ok("for (var x = ('a' in o); x; ) {}");
    assert!(matches!(program.body[0], Stmt::For(_)));
}

#[test]
fn binding_patterns_in_declarations() {
    let program = parse_ok("let {a, b: [c, , d], ...rest} = obj; const [x = 1, ...ys] = arr;");
    let Stmt::VarDecl(decl) = &program.body[0] else {
        panic!()
    };
    assert!(matches!(decl.decls[0].name, Pat::Object(_)));
    let Stmt::VarDecl(decl) = &program.body[1] else {
        panic!()
    };
    assert!(matches!(decl.decls[0].name, Pat::Array(_)));
}

#[test]
fn labeled_break_and_continue() {
    let program = parse_ok("outer: for (;;) { continue outer; break outer; }");
    assert!(matches!(program.body[0], Stmt::Labeled(_)));
}

#[test]
fn asi_inserts_semicolons_at_line_breaks() {
    let program = parse_ok("var a = 1\nvar b = 2\n");
    assert_eq!(program.body.len(), 2);
}

#[test]
fn asi_restricts_return_argument() {
    let program = parse_ok("function f() { return\n1; }");
    let Stmt::FnDecl(func) = &program.body[0] else {
        panic!()
    };
    let Stmt::Return(ret) = &func.body.body[0] else {
        panic!("expected return");
    };
    assert!(ret.arg.is_none());
}

#[test]
fn switch_cases_and_default() {
    let program = parse_ok("switch (x) { case 1: a(); case 2: break; default: b(); }");
    let Stmt::Switch(switch) = &program.body[0] else {
        panic!()
    };
    assert_eq!(switch.cases.len(), 3);
    assert!(switch.cases[2].test.is_none());
}

#[test]
fn try_catch_finally_forms() {
    parse_ok("try { a(); } catch (e) { b(); }");
    parse_ok("try { a(); } finally { c(); }");
    parse_ok("try { a(); } catch { b(); } finally { c(); }");
    assert!(parse_err("try { a(); }").contains("missing catch or finally"));
}

#[test]
fn object_literal_forms() {
    let program = parse_ok("var o = {a: 1, b, 'c': 2, 3: x, m(p) { return p; }};");
    let Stmt::VarDecl(decl) = &program.body[0] else {
        panic!()
    };
    let Some(Expr::Object(obj)) = &decl.decls[0].init else {
        panic!("expected object literal");
    };
    assert_eq!(obj.props.len(), 5);
    assert!(obj.props[1].shorthand);
    assert!(matches!(obj.props[4].value, Expr::Function(_)));
}

#[test]
fn array_literal_holes() {
    let program = parse_ok("var a = [1, , 2, ];");
    let Stmt::VarDecl(decl) = &program.body[0] else {
        panic!()
    };
    let Some(Expr::Array(arr)) = &decl.decls[0].init else {
        panic!("expected array literal");
    };
    assert_eq!(arr.elems.len(), 3);
    assert!(arr.elems[1].is_none());
}

#[test]
fn keyword_property_names() {
    parse_ok("o.delete(1); o.in = 2; var p = {new: 3};");
}

#[test]
fn async_and_generator_function_headers() {
    let program = parse_ok("async function f() {} function* g() {}");
    let Stmt::FnDecl(f) = &program.body[0] else {
        panic!()
    };
    assert!(f.is_async);
    let Stmt::FnDecl(g) = &program.body[1] else {
        panic!()
    };
    assert!(g.is_generator);
}

#[test]
fn locations_cover_nodes() {
    let program = parse_ok("var xy = 1;\n  foo();");
    let Stmt::VarDecl(decl) = &program.body[0] else {
        panic!()
    };
    assert_eq!(decl.loc.start.line, 1);
    assert_eq!(decl.loc.start.col, 0);
    let Stmt::Expr(stmt) = &program.body[1] else {
        panic!()
    };
    assert_eq!(stmt.loc.start.line, 2);
    assert_eq!(stmt.loc.start.col, 2);
}

// Unsupported constructs are fatal and name the construct.

#[test]
fn unsupported_constructs_fail_fast() {
    for (src, construct) in [
        ("class A {}", "class declaration"),
        ("var c = class {};", "class expression"),
        ("import x from 'm';", "import declaration"),
        ("export var x;", "export declaration"),
        ("with (o) {}", "with statement"),
        ("f(...xs);", "spread element"),
        ("var a = [...xs];", "spread element"),
        ("a?.b;", "optional chaining"),
        ("new.target;", "meta-property"),
        ("[a, b] = xs;", "destructuring assignment"),
        ("({a} = o);", "destructuring assignment"),
        ("var o = {[k]: 1};", "computed property key"),
        ("var o = {get x() {}};", "getter/setter property"),
        ("yield 1;", "yield expression"),
        ("await p;", "await expression"),
    ] {
        let message = parse_err(src);
        assert_eq!(
            message,
            format!("not yet implemented: {construct}"),
            "for source {src:?}"
        );
    }
}

#[test]
fn plain_syntax_errors_are_not_unsupported() {
    assert!(parse_err("var = 1;").contains("expected binding pattern"));
    assert!(parse_err("a +;").contains("unexpected token"));
}
