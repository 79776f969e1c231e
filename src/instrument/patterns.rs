//! Binding-pattern walking.
//!
//! `collect_identifiers` returns the names a binding pattern introduces, in
//! source order. Default expressions are not scanned here - they are walked
//! later as ordinary expressions by the visitor.

use crate::parser::ast::{ObjectPatProp, Pat};

/// Collect the bound names of a binding pattern, in source order.
pub fn collect_identifiers(pat: &Pat) -> Vec<String> {
    let mut names = Vec::new();
    collect_into(pat, &mut names);
    names
}

fn collect_into(pat: &Pat, names: &mut Vec<String>) {
    match pat {
        Pat::Ident(ident) => names.push(ident.name.clone()),
        Pat::Array(array) => {
            // Holes contribute nothing.
            for elem in array.elems.iter().flatten() {
                collect_into(elem, names);
            }
        }
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue { value, .. } => collect_into(value, names),
                    ObjectPatProp::Rest(rest) => collect_into(&rest.arg, names),
                }
            }
        }
        // `x = default`: only the left side binds.
        Pat::Assign(assign) => collect_into(&assign.left, names),
        Pat::Rest(rest) => collect_into(&rest.arg, names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{Program, Stmt};
    use crate::parser::parse;

    fn pattern_of(src: &str) -> Pat {
        let program: Program = parse(src, "test.js").expect("parse");
        let Stmt::VarDecl(decl) = &program.body[0] else {
            panic!("expected var decl");
        };
        decl.decls[0].name.clone()
    }

    #[test]
    fn plain_name() {
        assert_eq!(collect_identifiers(&pattern_of("var x = 1;")), ["x"]);
    }

    #[test]
    fn object_pattern_recurses_into_values() {
        assert_eq!(
            collect_identifiers(&pattern_of("var {a, b: c, d: {e}} = o;")),
            ["a", "c", "e"]
        );
    }

    #[test]
    fn array_pattern_skips_holes() {
        assert_eq!(
            collect_identifiers(&pattern_of("var [a, , b] = xs;")),
            ["a", "b"]
        );
    }

    #[test]
    fn rest_recurses_into_argument() {
        assert_eq!(
            collect_identifiers(&pattern_of("var [a, ...rest] = xs;")),
            ["a", "rest"]
        );
        assert_eq!(
            collect_identifiers(&pattern_of("var {a, ...others} = o;")),
            ["a", "others"]
        );
    }

    #[test]
    fn default_scans_only_the_left_side() {
        assert_eq!(
            collect_identifiers(&pattern_of("var [a = b, {c = d}] = xs;")),
            ["a", "c"]
        );
    }
}
