//! Canonical, interned type representation (C3, §3: "Type.").
//!
//! Every distinct structural shape maps to exactly one `TypeId`; pointer,
//! array, and function equality therefore reduce to `TypeId` equality by
//! construction, while named/primitive types compare nominally.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    I32,
    I64,
    F32,
    F64,
    Bool,
    Char,
    Void,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Void => "void",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "i32" => PrimitiveKind::I32,
            "i64" => PrimitiveKind::I64,
            "f32" => PrimitiveKind::F32,
            "f64" => PrimitiveKind::F64,
            "bool" => PrimitiveKind::Bool,
            "char" => PrimitiveKind::Char,
            "void" => PrimitiveKind::Void,
            _ => return None,
        })
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I32 | PrimitiveKind::I64 | PrimitiveKind::F32 | PrimitiveKind::F64
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(self, PrimitiveKind::I32 | PrimitiveKind::I64)
    }
}

/// A symbol reference baked into a type, as it will be produced by the
/// symbol table (C4). Kept as a bare `u32` here so `glint-ast` does not
/// depend on the symbol-table crate.
pub type SymbolId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveKind),
    Named(SymbolId),
    Pointer(TypeId),
    Array(TypeId, Option<u64>),
    Function {
        return_type: TypeId,
        params: Vec<TypeId>,
        varargs: bool,
    },
    /// A not-yet-resolved type variable, identified by its own id. Distinct
    /// from other `Unresolved` variables even when structurally identical,
    /// so each one gets its own union-find slot.
    Unresolved(u32),
}

/// Classifier result for a source→target conversion (§4.3 "Conversions").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Identity,
    ImplicitNumeric,
    ExplicitNumeric,
    PointerBitcast,
    PrimitiveToString,
    StringToPrimitive,
    NoConversion,
}

/// Facade over the interned type universe plus a path-compressed
/// union-find substitution map for `Unresolved` variables (§4.3).
pub struct TypeSystem {
    interned: DashMap<Type, TypeId>,
    storage: DashMap<TypeId, Type>,
    substitution: DashMap<u32, TypeId>,
    next_id: AtomicU32,
    next_unresolved: AtomicU32,
}

impl TypeSystem {
    pub fn new() -> Self {
        Self {
            interned: DashMap::new(),
            storage: DashMap::new(),
            substitution: DashMap::new(),
            next_id: AtomicU32::new(0),
            next_unresolved: AtomicU32::new(0),
        }
    }

    fn intern(&self, ty: Type) -> TypeId {
        if let Some(existing) = self.interned.get(&ty) {
            return *existing;
        }
        let id = TypeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.interned.insert(ty.clone(), id);
        self.storage.insert(id, ty);
        id
    }

    pub fn get(&self, id: TypeId) -> Type {
        self.storage
            .get(&id)
            .map(|entry| entry.clone())
            .expect("TypeId not present in this TypeSystem")
    }

    pub fn get_primitive(&self, kind: PrimitiveKind) -> TypeId {
        self.intern(Type::Primitive(kind))
    }

    pub fn get_pointer(&self, inner: TypeId) -> TypeId {
        self.intern(Type::Pointer(inner))
    }

    pub fn get_array(&self, element: TypeId, size: Option<u64>) -> TypeId {
        self.intern(Type::Array(element, size))
    }

    pub fn get_function(&self, return_type: TypeId, params: Vec<TypeId>, varargs: bool) -> TypeId {
        self.intern(Type::Function {
            return_type,
            params,
            varargs,
        })
    }

    pub fn get_named(&self, symbol: SymbolId) -> TypeId {
        self.intern(Type::Named(symbol))
    }

    /// Allocate a fresh, never-before-seen type variable.
    pub fn get_unresolved(&self) -> TypeId {
        let var = self.next_unresolved.fetch_add(1, Ordering::Relaxed);
        self.intern(Type::Unresolved(var))
    }

    /// Follow the substitution chain for `id`, compressing it to point
    /// directly at the root once found.
    pub fn resolve(&self, id: TypeId) -> TypeId {
        let var = match self.storage.get(&id).map(|e| e.clone()) {
            Some(Type::Unresolved(v)) => v,
            _ => return id,
        };
        match self.substitution.get(&var).map(|e| *e) {
            Some(next) => {
                let root = self.resolve(next);
                self.substitution.insert(var, root);
                root
            }
            None => id,
        }
    }

    /// Bind the unresolved variable `var` to `target`. No-op if `var` is
    /// not actually an unresolved variable.
    pub fn unify(&self, var: TypeId, target: TypeId) {
        if let Some(Type::Unresolved(v)) = self.storage.get(&var).map(|e| e.clone()) {
            self.substitution.insert(v, target);
        }
    }

    pub fn predefined(&self) -> PredefinedTypes {
        PredefinedTypes {
            i32: self.get_primitive(PrimitiveKind::I32),
            i64: self.get_primitive(PrimitiveKind::I64),
            f32: self.get_primitive(PrimitiveKind::F32),
            f64: self.get_primitive(PrimitiveKind::F64),
            bool: self.get_primitive(PrimitiveKind::Bool),
            char: self.get_primitive(PrimitiveKind::Char),
            void: self.get_primitive(PrimitiveKind::Void),
        }
    }

    /// Classify the conversion required to use a value of `from` where
    /// `to` is expected (§4.3).
    pub fn classify_conversion(&self, from: TypeId, to: TypeId) -> Conversion {
        if from == to {
            return Conversion::Identity;
        }
        let (from_ty, to_ty) = (self.get(from), self.get(to));
        match (&from_ty, &to_ty) {
            (Type::Primitive(a), Type::Primitive(b)) if a.is_numeric() && b.is_numeric() => {
                if numeric_rank(*a) <= numeric_rank(*b) {
                    Conversion::ImplicitNumeric
                } else {
                    Conversion::ExplicitNumeric
                }
            }
            (Type::Pointer(_), Type::Pointer(_)) => Conversion::PointerBitcast,
            (Type::Primitive(a), Type::Named(_)) if a.is_numeric() || *a == PrimitiveKind::Bool || *a == PrimitiveKind::Char => {
                Conversion::PrimitiveToString
            }
            (Type::Named(_), Type::Primitive(b)) if b.is_numeric() || *b == PrimitiveKind::Bool || *b == PrimitiveKind::Char => {
                Conversion::StringToPrimitive
            }
            _ => Conversion::NoConversion,
        }
    }
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric_rank(kind: PrimitiveKind) -> u8 {
    match kind {
        PrimitiveKind::I32 => 0,
        PrimitiveKind::I64 => 1,
        PrimitiveKind::F32 => 2,
        PrimitiveKind::F64 => 3,
        _ => u8::MAX,
    }
}

/// The handful of types every compilation unit needs without looking
/// anything up by name (§4.3: "predefined primitives").
pub struct PredefinedTypes {
    pub i32: TypeId,
    pub i64: TypeId,
    pub f32: TypeId,
    pub f64: TypeId,
    pub bool: TypeId,
    pub char: TypeId,
    pub void: TypeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates_structurally_equal_types() {
        let ts = TypeSystem::new();
        let a = ts.get_pointer(ts.get_primitive(PrimitiveKind::I32));
        let b = ts.get_pointer(ts.get_primitive(PrimitiveKind::I32));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_unresolved_vars_are_distinct_ids() {
        let ts = TypeSystem::new();
        assert_ne!(ts.get_unresolved(), ts.get_unresolved());
    }

    #[test]
    fn unify_resolves_through_a_chain() {
        let ts = TypeSystem::new();
        let v1 = ts.get_unresolved();
        let v2 = ts.get_unresolved();
        let concrete = ts.get_primitive(PrimitiveKind::I64);
        ts.unify(v1, v2);
        ts.unify(v2, concrete);
        assert_eq!(ts.resolve(v1), concrete);
    }

    #[test]
    fn widening_numeric_conversion_is_implicit() {
        let ts = TypeSystem::new();
        let i32_ty = ts.get_primitive(PrimitiveKind::I32);
        let i64_ty = ts.get_primitive(PrimitiveKind::I64);
        assert_eq!(ts.classify_conversion(i32_ty, i64_ty), Conversion::ImplicitNumeric);
        assert_eq!(ts.classify_conversion(i64_ty, i32_ty), Conversion::ExplicitNumeric);
    }
}
