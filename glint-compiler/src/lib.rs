pub mod codegen; // Three-pass LLVM codegen (C6)
pub mod jit; // JIT execution engine + AOT object emission (C7)
pub mod scope_manager; // ARC scope tracking for codegen (C7)
pub mod semantic; // Two-phase registration + resolution (C5)
pub mod symbol_table; // Scope stack + class/method registries (C4)

pub use codegen::{compile_unit, CodegenError, CodegenResult};
pub use jit::{compile_to_object, CompileOptions, JitHost};
pub use scope_manager::{ArcRegistration, ScopeKind, ScopeManager};
pub use semantic::{analyze, SemanticIR, UsageEdge};
pub use symbol_table::{ClassSymbol, FieldInfo, MethodSymbol, SymbolTable, ValueCategory};
