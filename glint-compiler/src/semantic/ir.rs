//! The semantic analyzer's result type (C5, §4.5: "`analyze(CompilationUnit)
//! → SemanticIR`").

use crate::symbol_table::{SymbolTable, ValueCategory};
use glint_ast::{TypeId, TypeSystem};
use glint_diagnostics::{DiagnosticEngine, NodeId, Span};
use std::collections::HashMap;

/// One caller→callee edge for the usage graph (§4.5 "Usage graph").
#[derive(Debug, Clone)]
pub struct UsageEdge {
    pub context_class: Option<String>,
    pub callee_qualified_name: String,
    pub location: Span,
    /// True when the callee's declaration appears strictly later in the
    /// file than the call site.
    pub is_forward: bool,
}

/// Everything Phase A/B produced: the populated symbol table, the
/// resolved type of every expression node, the usage graph, and the
/// accumulated diagnostics.
pub struct SemanticIR {
    pub symbols: SymbolTable,
    pub types: TypeSystem,
    pub usage_graph: Vec<UsageEdge>,
    pub diagnostics: DiagnosticEngine,
    /// Resolved type + value category per expression node, populated
    /// during Phase B.
    pub expr_types: HashMap<NodeId, (TypeId, ValueCategory)>,
    /// Call-expression node id → the `MethodSymbol` qualified name it
    /// resolved to, so codegen never has to re-run overload resolution.
    pub resolved_calls: HashMap<NodeId, String>,
    pub has_errors: bool,
}

impl SemanticIR {
    pub fn expr_type(&self, id: NodeId) -> Option<TypeId> {
        self.expr_types.get(&id).map(|(ty, _)| *ty)
    }
}
