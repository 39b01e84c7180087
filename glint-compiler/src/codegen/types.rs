//! `glint_ast::Type` → LLVM type mapping (§3 "Type.", §4.6 Pass 1).
//!
//! Every `Named` type — the `string` builtin and every user class alike
//! — lowers to the same opaque `ptr`: a class instance is represented by
//! its *fields* pointer (the header sits immediately before it in
//! memory, §6), and a string by a direct `GlintString*`. Which one a
//! given `ptr` is is a codegen-time fact (is this class's qualified name
//! `"string"`?), not something the LLVM type system distinguishes.

use super::error::{CodegenError, CodegenResult};
use super::Codegen;
use glint_ast::{PrimitiveKind, Type, TypeId};
use inkwell::types::BasicTypeEnum;
use inkwell::AddressSpace;

impl<'ctx, 'ir> Codegen<'ctx, 'ir> {
    pub fn is_string_class(&self, class_name: &str) -> bool {
        class_name == "string"
    }

    /// True when `ty` resolves to the `string` pseudo-class specifically
    /// (as opposed to a user class or a non-`Named` type).
    pub fn is_string_type(&self, ty: TypeId) -> bool {
        matches!(self.class_name_of(ty).as_deref(), Some("string"))
    }

    pub fn class_name_of(&self, ty: TypeId) -> Option<String> {
        match self.ir.types.get(ty) {
            Type::Named(symbol_id) => self.ir.symbols.find_class_by_symbol_id(symbol_id).map(|c| c.qualified_name.clone()),
            _ => None,
        }
    }

    pub fn llvm_type_of(&self, ty: TypeId) -> CodegenResult<BasicTypeEnum<'ctx>> {
        let ptr = self.context.ptr_type(AddressSpace::default());
        Ok(match self.ir.types.get(ty) {
            Type::Primitive(PrimitiveKind::I32) => self.context.i32_type().into(),
            Type::Primitive(PrimitiveKind::I64) => self.context.i64_type().into(),
            Type::Primitive(PrimitiveKind::F32) => self.context.f32_type().into(),
            Type::Primitive(PrimitiveKind::F64) => self.context.f64_type().into(),
            Type::Primitive(PrimitiveKind::Bool) => self.context.bool_type().into(),
            // Stored as a Unicode scalar value, matching `String_from_char`/
            // `String_to_char`'s `u32` ABI (§6).
            Type::Primitive(PrimitiveKind::Char) => self.context.i32_type().into(),
            Type::Primitive(PrimitiveKind::Void) => {
                return Err(CodegenError::internal("llvm_type_of", "void has no value representation"));
            }
            Type::Named(_) => ptr.into(),
            Type::Pointer(_) => ptr.into(),
            Type::Array(elem, Some(size)) => {
                let elem_ty = self.llvm_type_of(elem)?;
                elem_ty.array_type(size as u32).into()
            }
            // A dynamically-sized array has no length-tracking runtime
            // support in this core (§1 non-goals stop short of a real
            // collections library) — it is represented as a bare
            // pointer to its first element.
            Type::Array(_, None) => ptr.into(),
            Type::Function { .. } => ptr.into(),
            Type::Unresolved(_) => {
                return Err(CodegenError::internal("llvm_type_of", "unresolved type reached codegen"));
            }
        })
    }
}
