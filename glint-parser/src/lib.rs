//! Recursive-descent / Pratt parser (C2, §4.2).
//!
//! Unlike a `Result`-returning parser, syntax errors are collected as
//! [`glint_diagnostics::Diagnostic`]s and recovered from via
//! [`Parser::synchronize`] so a single pass can report more than one
//! error and still hand back a well-formed (if partly `Error`-node-
//! filled) tree for later passes to keep walking.

mod parser;

pub use parser::Parser;

use glint_ast::CompilationUnit;
use glint_diagnostics::{Diagnostic, SpanMap};
use glint_lexer::Token;

/// Parses a full token stream into a compilation unit, its span table,
/// and whatever diagnostics were raised along the way.
pub fn parse(tokens: Vec<Token>, file_name: &str) -> (CompilationUnit, SpanMap, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens, file_name);
    let unit = parser::parse_compilation_unit(&mut parser);
    let (spans, diagnostics) = parser.finish();
    (unit, spans, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_lexer::{tokenize, LexOptions};

    fn parse_source(source: &str) -> (CompilationUnit, Vec<Diagnostic>) {
        let (tokens, lex_diagnostics) = tokenize(source, "test.glint", LexOptions::default());
        assert!(lex_diagnostics.is_empty(), "unexpected lex diagnostics: {lex_diagnostics:?}");
        let (unit, _spans, diagnostics) = parse(tokens, "test.glint");
        (unit, diagnostics)
    }

    #[test]
    fn parses_a_free_function() {
        let (unit, diagnostics) = parse_source(
            r#"
            fn add(a: i32, b: i32): i32 {
                return a + b;
            }
            "#,
        );
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        assert_eq!(unit.declarations.len(), 1);
        assert!(matches!(unit.declarations[0], glint_ast::Declaration::Function(_)));
    }

    #[test]
    fn parses_a_class_with_constructor_and_field() {
        let (unit, diagnostics) = parse_source(
            r#"
            class Point {
                x: i32;
                y: i32;

                Point(x: i32, y: i32) {
                    this.x = x;
                }

                ~Point() {
                }
            }
            "#,
        );
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        let glint_ast::Declaration::Type(type_decl) = &unit.declarations[0] else {
            panic!("expected a type declaration");
        };
        assert_eq!(type_decl.members.len(), 4);
    }

    #[test]
    fn parses_nested_generic_type_arguments_with_split_rshift() {
        let (unit, diagnostics) = parse_source(
            r#"
            fn wrap(x: Box<Box<i32>>): i32 {
                return 0;
            }
            "#,
        );
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        assert_eq!(unit.declarations.len(), 1);
    }

    #[test]
    fn recovers_after_a_syntax_error_and_keeps_parsing() {
        let (unit, diagnostics) = parse_source(
            r#"
            fn broken( {
                return;
            }

            fn ok(): i32 {
                return 1;
            }
            "#,
        );
        assert!(!diagnostics.is_empty());
        assert!(unit
            .declarations
            .iter()
            .any(|d| matches!(d, glint_ast::Declaration::Function(f) if f.name == "ok")));
    }

    #[test]
    fn parses_if_while_for_and_match_statements() {
        let (unit, diagnostics) = parse_source(
            r#"
            fn run(): void {
                var i: i32 = 0;
                while (i < 10) {
                    i = i + 1;
                }
                for (j in range) {
                    i = i + j;
                }
                if (i > 5) {
                    return;
                } else {
                    return;
                }
            }
            "#,
        );
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        assert_eq!(unit.declarations.len(), 1);
    }

    #[test]
    fn parses_lambda_and_ternary_and_cast_expressions() {
        let (unit, diagnostics) = parse_source(
            r#"
            fn run(): i32 {
                var f: i32 = (a: i32, b: i32) => a + b;
                var t: i32 = true ? 1 : 2;
                var c: i32 = (i32)3.5;
                return 0;
            }
            "#,
        );
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        assert_eq!(unit.declarations.len(), 1);
    }
}
