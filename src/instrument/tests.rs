//! End-to-end tests over the emitted text.
//!
//! These assert the instrumented output structurally: which hook calls
//! appear, how they nest, and in what order. Since evaluation order of the
//! emitted fragments follows JavaScript's own order, the nesting asserted
//! here pins down the runtime event order as well.

use std::collections::BTreeMap;

use crate::driver::instrument_source;
use crate::instrument::InstrumentOptions;

fn instrument(src: &str) -> String {
    instrument_source(src, "a.js", "a__jstrument__.js", &InstrumentOptions::default())
        .expect("instrument")
}

/// Every `D$.<Hook>(<id>` call in emission order, with its site id.
fn hook_calls(out: &str) -> Vec<(String, u32)> {
    let mut calls = Vec::new();
    let bytes = out.as_bytes();
    let mut from = 0;
    while let Some(found) = out[from..].find("D$.") {
        let name_start = from + found + 3;
        let mut name_end = name_start;
        while name_end < bytes.len() && bytes[name_end].is_ascii_alphabetic() {
            name_end += 1;
        }
        from = name_start;
        if name_end == name_start || name_end >= bytes.len() || bytes[name_end] != b'(' {
            continue; // D$.ids assignment, D$._t scratch slots
        }
        let mut digits_end = name_end + 1;
        let mut id = 0u32;
        while digits_end < bytes.len() && bytes[digits_end].is_ascii_digit() {
            id = id * 10 + (bytes[digits_end] - b'0') as u32;
            digits_end += 1;
        }
        if digits_end > name_end + 1 {
            calls.push((out[name_start..name_end].to_string(), id));
        }
    }
    calls
}

fn id_table(out: &str) -> BTreeMap<String, [u32; 4]> {
    let line = out
        .lines()
        .nth(1)
        .expect("preamble has the table on line 2");
    let json = line
        .strip_prefix("D$.ids = ")
        .and_then(|s| s.strip_suffix(';'))
        .expect("table assignment shape");
    serde_json::from_str(json).expect("table parses")
}

#[track_caller]
fn assert_in_order(out: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match out[from..].find(needle) {
            Some(found) => from += found + needle.len(),
            None => panic!("expected {needle:?} after byte {from} in:\n{out}"),
        }
    }
}

// =============================================================================
// Representative programs, end to end
// =============================================================================

#[test]
fn scenario_var_with_binary_initializer() {
    let out = instrument("var x = 1 + 2;");
    assert_in_order(
        &out,
        &[
            "D$.Se(1, \"a__jstrument__.js\", \"a.js\");",
            "D$.D(2, \"x\", \"var\", x);",
            "var x = D$.W(3, [\"x\"], D$.E(4, D$.B(5, \"+\", D$.L(6, 1, 3), D$.L(7, 2, 3))));",
            "D$.X(8, e);",
            "D$.Sx(9);",
        ],
    );
}

#[test]
fn scenario_if_with_lexical_block() {
    let out = instrument("if (a > 0) { let y = a; }");
    assert_in_order(
        &out,
        &[
            "if (D$.C(2, \"if\", D$.E(3, D$.B(4, \">\", D$.R(5, \"a\", a), D$.L(6, 0, 3))))) {",
            "D$.D(7, \"y\", \"let\");",
            "let y = D$.W(8, [\"y\"], D$.E(9, D$.R(10, \"a\", a)));",
        ],
    );
    // TDZ: the lexical declare carries no value argument.
    assert!(!out.contains("\"let\", y"));
}

#[test]
fn scenario_function_declaration_and_call() {
    let out = instrument("function f(n){ return n*2; } f(3);");
    assert_in_order(
        &out,
        &[
            "D$.D(2, \"f\", \"function\", f);",
            "function f(n) {",
            "try {",
            "D$.Fe(3, f, this, arguments);",
            "D$.D(4, \"arguments\", \"arguments\", arguments);",
            "D$.D(5, \"n\", \"param\", n);",
            "return D$.Re(6, D$.E(7, D$.B(8, \"*\", D$.R(9, \"n\", n), D$.L(10, 2, 3))));",
            "D$.Fx(",
            "D$.E(13, D$.F(14, D$.R(15, \"f\", f), false)(D$.L(16, 3, 3)));",
        ],
    );
}

#[test]
fn scenario_caught_throw() {
    let out = instrument("try { throw \"e\"; } catch(x) { }");
    assert_in_order(
        &out,
        &[
            "try {",
            "throw D$.Th(2, D$.E(3, D$.L(4, \"e\", 0)));",
            "} catch (x) {",
            "D$.D(5, \"x\", \"catch-param\", x);",
        ],
    );
}

#[test]
fn scenario_lexical_for_redeclares_per_iteration() {
    let out = instrument("for (let i=0; i<2; i++) {}");
    assert_in_order(
        &out,
        &[
            "D$.D(2, \"i\", \"let\");",
            "for (let i = D$.W(3, [\"i\"], D$.E(4, D$.L(5, 0, 3))); ",
            "D$.C(6, \"for\", D$.E(7, D$.B(8, \"<\", D$.R(9, \"i\", i), D$.L(10, 2, 3)))); ",
            "D$.Up(11, 12, \"++\", false, D$.R(13, \"i\", i), (v) => (i = D$.W(14, [\"i\"], v)))) {",
            "D$.D(15, \"i\", \"let\");",
        ],
    );
}

// The no-instrument marker path is covered by the driver tests.

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn ids_are_unique_and_strictly_increasing_in_emission_order() {
    let out = instrument(
        "var a = 1; function f(x) { return x + a; } \
         for (let i = 0; i < 3; i++) { a += f(i); } \
         var o = {p: 1}; o.p = a > 1 ? a : -a; delete o.p;",
    );
    let calls = hook_calls(&out);
    assert!(calls.len() > 20, "expected a rich call set, got {calls:?}");
    let ids: Vec<u32> = calls.iter().map(|(_, id)| *id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len(), "duplicate first-argument id");
    assert!(
        ids.windows(2).all(|w| w[0] < w[1]),
        "ids not strictly increasing in emission order: {ids:?}"
    );
}

#[test]
fn location_table_covers_real_sites_only() {
    let out = instrument("var x = 1 + 2;");
    let table = id_table(&out);
    // Declare hooks are synthesized sites: id 2 has no entry.
    assert!(!table.contains_key("2"));
    // The literal `1` spans columns 9..10 (1-based in the table).
    assert_eq!(table.get("6"), Some(&[1, 9, 1, 10]));
    // The script-enter site covers the whole program.
    assert_eq!(table.get("1"), Some(&[1, 1, 1, 15]));
}

#[test]
fn lexical_declares_fire_before_block_statements() {
    let out = instrument("{ f(); let z = 1; }");
    let declare = out.find("D$.D(").expect("declare hook");
    let call = out.find("D$.F(").expect("call wrapper");
    assert!(declare < call, "declare must precede the block's statements");
}

#[test]
fn reads_wrap_and_binding_targets_stay_bare() {
    let out = instrument("x = y;");
    assert!(out.contains("(x = D$.W("));
    assert!(out.contains("D$.R("));
    assert!(!out.contains("D$.R(2, \"x\""), "write target must not read");
}

// =============================================================================
// Construct coverage
// =============================================================================

#[test]
fn logical_wraps_left_operand_only() {
    let out = instrument("a && b;");
    assert_in_order(&out, &["(D$.C(", "\"&&\", D$.R(", " && D$.R("]);
}

#[test]
fn conditional_wraps_test_only() {
    let out = instrument("a ? b : c;");
    assert_in_order(&out, &["(D$.C(", "\"?\", D$.R(", " ? D$.R(", " : D$.R("]);
}

#[test]
fn while_and_do_while_conditions() {
    let out = instrument("while (a) {} do {} while (b);");
    assert!(out.contains("while (D$.C("));
    assert!(out.contains("\"while\""));
    assert!(out.contains("\"do-while\""));
}

#[test]
fn switch_stores_discriminant_and_compares_cases() {
    let out = instrument("switch (x) { case 1: break; default: break; }");
    assert_in_order(
        &out,
        &["switch (D$.Swl(", "case D$.Swr(", "default:"],
    );
}

#[test]
fn switch_with_lexical_case_body_gets_wrapper_block() {
    let out = instrument("switch (x) { case 1: let v = 2; }");
    let declare = out.find("D$.D(").expect("declare");
    let swl = out.find("D$.Swl(").expect("swl");
    assert!(declare < swl, "switch-body lexicals declare before the switch");
}

#[test]
fn member_read_and_write() {
    let out = instrument("var v = o.p; o.p = 1; o[k] = 2;");
    assert!(out.contains("D$.G("));
    assert!(out.contains(", \"p\")"));
    assert!(out.contains("D$.P("));
    // Computed keys are walked, not stringified.
    assert!(out.contains("D$.R(") && out.contains("\"k\""));
}

#[test]
fn method_call_keeps_base_plain_call_does_not() {
    let out = instrument("o.m(1); f(2);");
    assert_in_order(&out, &["D$.M(", "\"m\", false)(", "D$.F(", "false)(D$.L("]);
}

#[test]
fn constructor_calls_set_the_ctor_flag() {
    let out = instrument("new F(1); new o.C(2);");
    assert!(out.contains("D$.F(") && out.contains("true)(D$.L("));
    assert!(out.contains("D$.M(") && out.contains("\"C\", true)("));
}

#[test]
fn delete_member_uses_the_delete_hook() {
    let out = instrument("delete o.p;");
    assert!(out.contains("D$.De("));
    assert!(!out.contains("D$.U("));
}

#[test]
fn delete_of_non_member_is_fatal() {
    let err = instrument_source("delete x;", "a.js", "b.js", &InstrumentOptions::default())
        .unwrap_err();
    assert_eq!(
        err.message,
        "not yet implemented: delete of a non-member expression"
    );
}

#[test]
fn typeof_and_void_use_the_unary_hook() {
    let out = instrument("typeof x; void 0; -y;");
    assert!(out.contains("D$.U(") && out.contains("\"typeof\""));
    assert!(out.contains("\"void\""));
    assert!(out.contains("\"-\""));
}

#[test]
fn update_of_member_memoizes_the_base() {
    let out = instrument("o.p++;");
    assert_in_order(
        &out,
        &[
            "(D$._t = D$.R(",
            "D$.Up(",
            "D$.G(",
            "D$._t, \"p\")",
            "(v) => D$.P(",
            "D$._t, \"p\", v))",
        ],
    );
}

#[test]
fn update_of_computed_member_memoizes_the_key_too() {
    let out = instrument("o[k]++;");
    assert_in_order(&out, &["D$._t2 = ", "D$.G(", "D$._t, D$._t2)", "(v) => D$.P("]);
}

#[test]
fn compound_assignment_expands_to_read_binary_write() {
    let out = instrument("x += 2;");
    assert_in_order(
        &out,
        &[
            "(x = D$.W(",
            "[\"x\"], D$.E(",
            "D$.B(",
            "\"+\", D$.R(",
            "\"x\", x), D$.L(",
            "2, 3))))",
        ],
    );
}

#[test]
fn compound_member_assignment_reads_and_writes_one_base() {
    let out = instrument("o.p *= 3;");
    assert_in_order(
        &out,
        &["(D$._t = D$.R(", "D$.P(", "D$._t, \"p\", D$.E(", "D$.B(", "\"*\", D$.G(", "D$._t, \"p\")"],
    );
}

#[test]
fn for_in_assigns_binding_from_the_temporary() {
    let out = instrument("for (var k in o) { use(k); }");
    assert_in_order(
        &out,
        &[
            "for (D$._t in D$.O(",
            "D$.R(",
            "\"o\", o), true)) {",
            "var k = D$.W(",
            "[\"k\"], D$._t);",
        ],
    );
}

#[test]
fn for_of_lexical_declares_per_iteration() {
    let out = instrument("for (const v of xs) {}");
    assert_in_order(
        &out,
        &[
            "for (D$._t of D$.O(",
            "false)) {",
            "D$.D(",
            "\"v\", \"const\");",
            "const v = D$.W(",
            "[\"v\"], D$._t);",
        ],
    );
}

#[test]
fn literal_type_codes() {
    let out = instrument("var a = 's'; var b = true; var c = null; var d = 1.5; var e = /x/g; var f = 2n;");
    assert!(out.contains("D$.L(") && out.contains("'s', 0)"));
    assert!(out.contains("true, 1)"));
    assert!(out.contains("null, 2)"));
    assert!(out.contains("1.5, 3)"));
    assert!(out.contains("/x/g, 4)"));
    assert!(out.contains("2n, 5)"));
}

#[test]
fn object_and_array_literals_wrap_in_literal_hook() {
    let out = instrument("var o = {a: 1, b}; var xs = [1, , 2];");
    assert!(out.contains("D$.L(") && out.contains("{ a: D$.L("));
    // Shorthand expands, so the value identifier is read.
    assert!(out.contains("b: D$.R("));
    assert!(out.contains("[D$.L(") && out.contains(", , D$.L("));
}

#[test]
fn function_expression_reports_as_literal() {
    let out = instrument("var f = function g(a) { return a; };");
    assert_in_order(
        &out,
        &["D$.W(", "D$.E(", "D$.L(", "function g(a) {", "D$.Fe(", "g, this, arguments)"],
    );
    // A named function expression binds its own name inside itself.
    assert!(out.contains("\"g\", \"function\", g);"));
}

#[test]
fn arrow_function_has_no_arguments_binding() {
    let out = instrument("var f = (x) => x + 1;");
    assert_in_order(
        &out,
        &["D$.L(", "(x) => {", "D$.Fe(", "null, this, null)", "\"x\", \"param\", x);", "return D$.Re("],
    );
    assert!(!out.contains("\"arguments\""));
}

#[test]
fn async_arrow_keeps_its_prefix() {
    let out = instrument("var f = async (x) => x; var g = async y => y;");
    assert_in_order(
        &out,
        &["async (x) => {", "D$.Fe(", "null, this, null)", "async (y) => {"],
    );
}

#[test]
fn labeled_lexical_for_keeps_continue_target() {
    let out = instrument("outer: for (let i = 0; i < 3; i++) { continue outer; }");
    // The synthesized wrapper block carries the header declare; the label
    // stays on the loop itself so `continue` still targets an iteration
    // statement.
    assert_in_order(
        &out,
        &[
            "D$.D(",
            "\"i\", \"let\");",
            "outer: for (let i = D$.W(",
            "continue outer;",
        ],
    );
    assert!(!out.contains("outer: {"));
}

#[test]
fn sequence_and_grouping() {
    let out = instrument("(a, b);");
    assert!(out.contains("(D$.R(") && out.contains(", D$.R("));
}

#[test]
fn var_without_initializer_emits_bare_pattern() {
    let out = instrument("var x;");
    assert!(out.contains("var x;"));
    assert!(!out.contains("var x = "));
    // The declare hook still fires with the (undefined) binding.
    assert!(out.contains("\"x\", \"var\", x);"));
}

#[test]
fn destructuring_declaration_writes_all_names() {
    let out = instrument("var {a, b: [c]} = o;");
    assert!(out.contains("var {a, b: [c]} = D$.W("));
    assert!(out.contains("[\"a\", \"c\"]"));
}

#[test]
fn return_without_argument_reports_undefined() {
    let out = instrument("function f() { return; }");
    assert!(out.contains("return D$.Re(") && out.contains(", undefined);"));
}

#[test]
fn this_is_emitted_bare() {
    let out = instrument("function f() { return this; }");
    assert!(out.contains("D$.E(") && out.contains(", this)"));
}

#[test]
fn labels_are_never_wrapped() {
    let out = instrument("loop: for (;;) { break loop; }");
    assert!(out.contains("loop: for (; ; )") || out.contains("loop: for ("));
    assert!(out.contains("break loop;"));
    assert!(!out.contains("\"loop\""));
}

#[test]
fn nested_functions_each_get_their_own_scaffold() {
    let out = instrument("function outer() { function inner() {} }");
    let fe_count = out.matches("D$.Fe(").count();
    let fx_count = out.matches("D$.Fx(").count();
    assert_eq!(fe_count, 2);
    assert_eq!(fx_count, 2);
    // inner is hoisted within outer's frame.
    assert!(out.contains("\"inner\", \"function\", inner);"));
}

#[test]
fn output_indentation_is_stable() {
    let out = instrument("if (a) { b(); }");
    // Program body sits one level deep (the script try), the block body two.
    assert!(out.contains("\n    if (D$.C("));
    assert!(out.contains("\n        D$.E("));
}
