//! Pass 1 — structure & signatures (§4.6): fields structs, vtable
//! types/globals, and every function/method/constructor/destructor
//! LLVM signature. No bodies are generated here; this only has to make
//! every name Pass 2 might reference already resolvable in the module.

use super::mangling::{emitted_function_name, fields_struct_name, vtable_global_name, vtable_type_name};
use super::{ClassLayout, Codegen, CodegenError, CodegenResult};
use crate::symbol_table::ClassSymbol;
use glint_ast::{CompilationUnit, Declaration};
use inkwell::module::Linkage;
use inkwell::types::BasicType;
use inkwell::AddressSpace;

pub(crate) fn run(cg: &mut Codegen, unit: &CompilationUnit) -> CodegenResult<()> {
    let classes: Vec<ClassSymbol> = cg.ir.symbols.classes().filter(|c| c.qualified_name != "string").cloned().collect();
    for class in &classes {
        declare_fields_struct(cg, class)?;
    }
    for class in &classes {
        declare_vtable(cg, class)?;
    }
    for class in &classes {
        declare_methods(cg, class)?;
    }
    declare_free_functions(cg, unit)?;
    Ok(())
}

fn declare_fields_struct(cg: &mut Codegen, class: &ClassSymbol) -> CodegenResult<()> {
    let ptr = cg.context.ptr_type(AddressSpace::default());
    let mut field_types = Vec::with_capacity(class.field_names.len());
    for field in &class.field_names {
        let ty = crate::semantic::registration::resolve_type_ref(&field.ast_type, &cg.ir.symbols, &cg.ir.types);
        field_types.push(cg.llvm_type_of(ty).unwrap_or_else(|_| ptr.as_basic_type_enum()));
    }
    let struct_ty = cg.context.opaque_struct_type(&fields_struct_name(&class.qualified_name));
    struct_ty.set_body(&field_types, false);
    cg.classes.insert(
        class.qualified_name.clone(),
        ClassLayout {
            fields_struct: struct_ty,
            has_vtable: false,
            vtable_struct: None,
            vtable_global: None,
        },
    );
    Ok(())
}

/// A class needs a vtable global iff it (or an ancestor) declares at
/// least one virtual method or a destructor — both live in physical
/// vtable slots (§6 "VTable layout").
fn declare_vtable(cg: &mut Codegen, class: &ClassSymbol) -> CodegenResult<()> {
    let has_dtor = cg.ir.symbols.find_method(&format!("{}.<dtor>", class.qualified_name)).is_some();
    if class.virtual_method_order.is_empty() && !has_dtor {
        return Ok(());
    }
    let ptr = cg.context.ptr_type(AddressSpace::default());
    let slot_count = 1 + class.virtual_method_order.len();
    let slot_types = vec![ptr.as_basic_type_enum(); slot_count];
    let vtable_struct = cg.context.opaque_struct_type(&vtable_type_name(&class.qualified_name));
    vtable_struct.set_body(&slot_types, false);

    let global_name = vtable_global_name(&class.qualified_name);
    let global = cg.module.add_global(vtable_struct, None, &global_name);
    global.set_linkage(Linkage::Internal);
    // Initializer is set by Pass 3, once every method it references has
    // a defined `FunctionValue`.

    if let Some(layout) = cg.classes.get_mut(&class.qualified_name) {
        layout.has_vtable = true;
        layout.vtable_struct = Some(vtable_struct);
        layout.vtable_global = Some(global);
    }
    Ok(())
}

fn declare_methods(cg: &mut Codegen, class: &ClassSymbol) -> CodegenResult<()> {
    for method in cg.ir.symbols.methods().filter(|m| m.class_name == class.qualified_name).cloned().collect::<Vec<_>>() {
        let ptr = cg.context.ptr_type(AddressSpace::default());
        let mut param_types = Vec::new();
        if !method.is_static {
            // Implicit leading "fields pointer" receiver (§4.6 Pass 1).
            param_types.push(ptr.into());
        }
        for p in &method.param_types {
            param_types.push(cg.llvm_type_of(*p)?.into());
        }

        let fn_type = if method.is_constructor || method.is_destructor {
            cg.context.void_type().fn_type(&param_types, false)
        } else {
            let ret = cg.ir.types.get(method.return_type);
            if matches!(ret, glint_ast::Type::Primitive(glint_ast::PrimitiveKind::Void)) {
                cg.context.void_type().fn_type(&param_types, false)
            } else {
                cg.llvm_type_of(method.return_type)?.fn_type(&param_types, false)
            }
        };

        let name = emitted_function_name(&method.qualified_name);
        let function = cg.module.add_function(&name, fn_type, None);
        cg.functions.insert(method.qualified_name.clone(), function);
    }
    Ok(())
}

fn declare_free_functions(cg: &mut Codegen, unit: &CompilationUnit) -> CodegenResult<()> {
    declare_free_functions_in(cg, &unit.declarations)
}

fn declare_free_functions_in(cg: &mut Codegen, decls: &[Declaration]) -> CodegenResult<()> {
    for decl in decls {
        match decl {
            Declaration::Function(f) => declare_free_function(cg, &f.name)?,
            Declaration::Namespace(ns) => declare_free_functions_in(cg, &ns.members)?,
            _ => {}
        }
    }
    Ok(())
}

fn declare_free_function(cg: &mut Codegen, name: &str) -> CodegenResult<()> {
    let method = cg
        .ir
        .symbols
        .find_method(name)
        .ok_or_else(|| CodegenError::UnresolvedSymbol(name.to_string()))?
        .clone();
    let mut param_types = Vec::new();
    for p in &method.param_types {
        param_types.push(cg.llvm_type_of(*p)?.into());
    }
    let ret = cg.ir.types.get(method.return_type);
    let fn_type = if matches!(ret, glint_ast::Type::Primitive(glint_ast::PrimitiveKind::Void)) {
        cg.context.void_type().fn_type(&param_types, false)
    } else {
        cg.llvm_type_of(method.return_type)?.fn_type(&param_types, false)
    };
    let function = cg.module.add_function(name, fn_type, None);
    cg.functions.insert(name.to_string(), function);
    Ok(())
}
