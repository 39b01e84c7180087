//! The six end-to-end scenarios: source text, through the full
//! lex → parse → analyze → codegen pipeline, to a JIT-executed result.

use glint_compiler::jit::JitHost;
use inkwell::context::Context;
use inkwell::OptimizationLevel;

fn jit_i32(source: &str) -> i32 {
    let (tokens, lex_diagnostics) = glint_lexer::tokenize(source, "test.glint", glint_lexer::LexOptions::default());
    assert!(lex_diagnostics.is_empty(), "unexpected lex diagnostics: {lex_diagnostics:?}");

    let (unit, spans, parse_diagnostics) = glint_parser::parse(tokens, "test.glint");
    assert!(parse_diagnostics.is_empty(), "unexpected parse diagnostics: {parse_diagnostics:?}");

    let ir = glint_compiler::analyze(&unit, &spans, "test.glint");
    assert!(!ir.has_errors, "unexpected semantic errors: {:?}", ir.diagnostics.diagnostics());

    let context = Context::create();
    let module = glint_compiler::compile_unit(&context, "test", &unit, &ir).expect("codegen should succeed");

    let host = JitHost::new(module, OptimizationLevel::None).expect("JIT engine creation should succeed");
    host.call_i32("Main").expect("Main should resolve and run")
}

#[test]
fn arithmetic_and_overload() {
    let result = jit_i32("fn Main(): i32 { var a: i32 = 2; var b: i32 = 3; return a*b + b; }");
    assert_eq!(result, 9);
}

#[test]
fn virtual_dispatch() {
    let result = jit_i32(
        r#"
        class Animal { virtual fn speak(): i32 { return 1; } }
        class Dog : Animal { override fn speak(): i32 { return 2; } }
        fn Main(): i32 { var a: Animal = new Dog(); return a.speak(); }
        "#,
    );
    assert_eq!(result, 2);
}

#[test]
fn arc_retain_on_copy_keeps_the_field_readable() {
    // `b` is retained when it aliases `a`; both locals release on scope
    // exit. If the retain/release bookkeeping were wrong, either this
    // would double-free before returning (crash) or `b`'s field would
    // already be gone by the time it's read.
    let result = jit_i32(
        r#"
        class Box {
            value: i32;
            Box() { value = 42; }
        }
        fn Main(): i32 {
            var a: Box = new Box();
            var b: Box = a;
            return b.value;
        }
        "#,
    );
    assert_eq!(result, 42);
}

#[test]
fn string_concatenation_with_primitive_coercion() {
    let (tokens, lex_diagnostics) = glint_lexer::tokenize(
        r#"fn Main(): ptr void { return "x=" + 42 + ",b=" + true; }"#,
        "test.glint",
        glint_lexer::LexOptions::default(),
    );
    assert!(lex_diagnostics.is_empty());

    let (unit, spans, parse_diagnostics) = glint_parser::parse(tokens, "test.glint");
    assert!(parse_diagnostics.is_empty());

    let ir = glint_compiler::analyze(&unit, &spans, "test.glint");
    assert!(!ir.has_errors, "unexpected semantic errors: {:?}", ir.diagnostics.diagnostics());

    let context = Context::create();
    let module = glint_compiler::compile_unit(&context, "test", &unit, &ir).expect("codegen should succeed");
    let host = JitHost::new(module, OptimizationLevel::None).expect("JIT engine creation should succeed");
    let ptr = host.call_ptr("Main").expect("Main should resolve and run");

    let glint_str = ptr as *const glint_runtime::GlintString;
    let bytes = unsafe {
        let s = &*glint_str;
        std::slice::from_raw_parts(s.data as *const u8, s.length as usize)
    };
    assert_eq!(bytes, b"x=42,b=true");
}

#[test]
fn forward_reference_resolution() {
    let result = jit_i32("fn a(): i32 { return b(); } fn b(): i32 { return 7; } fn Main(): i32 { return a(); }");
    assert_eq!(result, 7);
}

#[test]
fn early_exit_cleanup() {
    let result = jit_i32(
        r#"
        class Box { }
        fn Main(): i32 {
            var i: i32 = 0;
            while (true) {
                var tmp: Box = new Box();
                i = i + 1;
                if (i == 3) { return i; }
                continue;
            }
        }
        "#,
    );
    assert_eq!(result, 3);
}
