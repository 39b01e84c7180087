//! Abstract syntax tree and canonical type system (C3).
//!
//! Closed sum types (`node`), a source-order visitor (`visitor`), the
//! interned type universe (`ty`), and the top-level declaration arena
//! (`arena`). Nothing in this crate resolves names or computes types —
//! that is the symbol table's and semantic analyzer's job — it only
//! defines the shapes they operate on.

pub mod arena;
pub mod node;
pub mod ty;
pub mod visitor;

pub use arena::AstArena;
pub use node::*;
pub use ty::{Conversion, PredefinedTypes, PrimitiveKind, SymbolId, Type, TypeId, TypeSystem};
pub use visitor::{DefaultVisitor, StructuralVisitor, Visitor};
