//! Two-phase semantic analyzer (C5, §4.5): registration (Phase A) followed
//! by body resolution and type checking (Phase B), producing a
//! [`SemanticIR`] that codegen (C6) consumes directly.

pub mod ir;
pub mod registration;
pub mod resolution;

pub use ir::{SemanticIR, UsageEdge};

use crate::symbol_table::SymbolTable;
use glint_ast::{CompilationUnit, TypeSystem};
use glint_diagnostics::{DiagnosticEngine, SpanMap};
use std::collections::HashMap;

/// Run Phase A then Phase B over a parsed compilation unit and return the
/// resulting IR. Phase B always runs, even when Phase A has already
/// produced errors — a class missing its base still gets its surviving
/// members body-checked, so a single run surfaces as many diagnostics as
/// possible rather than stopping at the first phase with a problem.
pub fn analyze(unit: &CompilationUnit, spans: &SpanMap, file_name: &str) -> SemanticIR {
    let mut symbols = SymbolTable::new();
    let types = TypeSystem::new();
    let mut diagnostics = DiagnosticEngine::new();
    let mut usage_graph = Vec::new();
    let mut expr_types = HashMap::new();
    let mut resolved_calls = HashMap::new();

    log::debug!(target: "glint_compiler::semantic", "phase A: registering {}", file_name);
    registration::register(unit, &mut symbols, &types, &mut diagnostics, spans, file_name);

    log::debug!(target: "glint_compiler::semantic", "phase B: resolving bodies for {}", file_name);
    resolution::resolve_bodies(
        unit,
        &mut symbols,
        &types,
        &mut diagnostics,
        spans,
        &mut usage_graph,
        &mut expr_types,
        &mut resolved_calls,
    );

    let has_errors = diagnostics.has_errors();
    SemanticIR {
        symbols,
        types,
        usage_graph,
        diagnostics,
        expr_types,
        resolved_calls,
        has_errors,
    }
}
