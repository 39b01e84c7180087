//! Pass 3 — vtable population (§4.6, §6 "VTable layout"): every class
//! with a vtable global gets its constant initializer assembled here,
//! once Pass 2 has given every method it might reference a defined
//! `FunctionValue`.

use super::{Codegen, CodegenError, CodegenResult};
use glint_ast::CompilationUnit;
use inkwell::values::BasicValueEnum;

pub(crate) fn run(cg: &mut Codegen, _unit: &CompilationUnit) -> CodegenResult<()> {
    let classes: Vec<String> = cg
        .classes
        .iter()
        .filter(|(_, layout)| layout.has_vtable)
        .map(|(name, _)| name.clone())
        .collect();

    for class_name in classes {
        populate_vtable(cg, &class_name)?;
    }
    Ok(())
}

fn populate_vtable(cg: &mut Codegen, class_name: &str) -> CodegenResult<()> {
    let layout = cg.classes.get(class_name).expect("has_vtable implies an entry");
    let vtable_struct = layout.vtable_struct.expect("has_vtable implies a struct type");
    let global = layout.vtable_global.expect("has_vtable implies a global");
    let ptr_type = cg.context.ptr_type(inkwell::AddressSpace::default());

    let class = cg.ir.symbols.find_class(class_name).ok_or_else(|| CodegenError::MissingClass(class_name.to_string()))?.clone();

    let mut slots: Vec<BasicValueEnum> = Vec::with_capacity(1 + class.virtual_method_order.len());

    let dtor = cg.ir.symbols.find_method_in_class(class_name, "<dtor>");
    slots.push(match dtor {
        Some(m) => {
            let function = cg
                .functions
                .get(&m.qualified_name)
                .copied()
                .ok_or_else(|| CodegenError::MissingMethod(m.qualified_name.clone()))?;
            function.as_global_value().as_pointer_value().into()
        }
        None => ptr_type.const_null().into(),
    });

    for entry in &class.virtual_method_order {
        let method_name = entry.rsplit('.').next().unwrap_or(entry.as_str());
        let method = cg
            .ir
            .symbols
            .find_method_in_class(class_name, method_name)
            .ok_or_else(|| CodegenError::MissingMethod(format!("{class_name}.{method_name}")))?;
        let function = cg
            .functions
            .get(&method.qualified_name)
            .copied()
            .ok_or_else(|| CodegenError::MissingMethod(method.qualified_name.clone()))?;
        slots.push(function.as_global_value().as_pointer_value().into());
    }

    if slots.len() != vtable_struct.count_fields() as usize {
        // Slot count mismatch would mean Pass 1 and Pass 3 disagree on
        // this class's layout; that's a codegen bug, not a source error.
        return Err(CodegenError::internal(
            "populate_vtable",
            format!("assembled vtable constant for `{class_name}` does not match its declared slot count"),
        ));
    }
    let const_struct = vtable_struct.const_named_struct(&slots);
    global.set_initializer(&const_struct);
    Ok(())
}
