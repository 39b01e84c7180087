//! Phase A — registration (§4.5): walk every namespace top-down,
//! without looking at any body, and populate the symbol table with
//! every class, field, and method signature. Assigns vtable slots for
//! virtuals and resolves override-slot reuse.

use crate::symbol_table::{ClassSymbol, FieldInfo, MethodSymbol, SymbolTable};
use glint_ast::{CompilationUnit, Declaration, TypeDecl, TypeId, TypeRef, TypeSystem};
use glint_diagnostics::{error_codes, DiagnosticEngine, SpanMap};

/// Resolve a type as written in source to its interned `TypeId`.
/// Named types fall through to `Unresolved` when the class is not (yet)
/// registered — registration retries in base-before-derived order so
/// this should only happen for a genuinely unknown name.
pub(crate) fn resolve_type_ref(type_ref: &TypeRef, symbols: &SymbolTable, types: &TypeSystem) -> TypeId {
    match type_ref {
        TypeRef::Primitive { name, .. } => match glint_ast::PrimitiveKind::from_name(name) {
            Some(kind) => types.get_primitive(kind),
            None => match symbols.find_class(name) {
                Some(class) => types.get_named(class.symbol_id),
                None => types.get_unresolved(),
            },
        },
        TypeRef::Named { path, .. } => {
            let name = path.join(".");
            match symbols.find_class(&name) {
                Some(class) => types.get_named(class.symbol_id),
                None => types.get_unresolved(),
            }
        }
        TypeRef::Pointer { inner, .. } => {
            let inner_ty = resolve_type_ref(inner, symbols, types);
            types.get_pointer(inner_ty)
        }
        TypeRef::Array { inner, size, .. } => {
            let inner_ty = resolve_type_ref(inner, symbols, types);
            let const_size = size.as_ref().and_then(|expr| match expr.as_ref() {
                glint_ast::Expression::Literal {
                    value: glint_ast::Literal::Integer(n),
                    ..
                } => Some(*n as u64),
                _ => None,
            });
            types.get_array(inner_ty, const_size)
        }
        TypeRef::Function { params, return_type, .. } => {
            let param_types = params.iter().map(|p| resolve_type_ref(p, symbols, types)).collect();
            let ret = resolve_type_ref(return_type, symbols, types);
            types.get_function(ret, param_types, false)
        }
        TypeRef::Error { .. } => types.get_unresolved(),
    }
}

/// Built-in pseudo-classes that exist without any user declaration —
/// currently only `string`, the target of every `Primitive→String`
/// conversion and of `"literal"` expressions (§4.3 "Conversions").
fn register_builtins(symbols: &mut SymbolTable) {
    let symbol_id = symbols.allocate_symbol_id();
    symbols.declare_class(ClassSymbol {
        symbol_id,
        name: "string".to_string(),
        qualified_name: "string".to_string(),
        base: None,
        field_names: Vec::new(),
        base_field_aliases: std::collections::HashMap::new(),
        virtual_method_order: Vec::new(),
        is_forward_declared: false,
        is_defined: true,
        declared_line: 0,
    });
}

pub fn register(
    unit: &CompilationUnit,
    symbols: &mut SymbolTable,
    types: &TypeSystem,
    diagnostics: &mut DiagnosticEngine,
    spans: &SpanMap,
    file_name: &str,
) {
    register_builtins(symbols);

    let mut pending: Vec<&TypeDecl> = Vec::new();
    collect_type_decls(&unit.declarations, &mut pending);

    // Base-before-derived registration: a class can only be declared
    // once its base (if any) already has its flattened field layout in
    // the table (§4.4 "Inheritance flattening").
    let mut iterations = 0;
    while !pending.is_empty() && iterations < 8 {
        iterations += 1;
        let mut next_round = Vec::new();
        for type_decl in pending {
            let base_ready = match &type_decl.base {
                Some(base_name) => symbols.find_class(base_name).is_some(),
                None => true,
            };
            if base_ready {
                register_class(type_decl, symbols, types, diagnostics, spans, file_name);
            } else {
                next_round.push(type_decl);
            }
        }
        pending = next_round;
    }
    for type_decl in pending {
        let span = spans.get_or_unknown(type_decl.id);
        diagnostics.emit_error(
            error_codes::UNKNOWN_BASE_CLASS,
            format!(
                "unknown base class `{}` for `{}`",
                type_decl.base.clone().unwrap_or_default(),
                type_decl.name
            ),
            span,
        );
    }

    register_free_functions(&unit.declarations, symbols, types);
}

fn collect_type_decls<'a>(decls: &'a [Declaration], out: &mut Vec<&'a TypeDecl>) {
    for decl in decls {
        match decl {
            Declaration::Type(type_decl) => out.push(type_decl),
            Declaration::Namespace(ns) => collect_type_decls(&ns.members, out),
            _ => {}
        }
    }
}

fn register_free_functions(decls: &[Declaration], symbols: &mut SymbolTable, types: &TypeSystem) {
    for decl in decls {
        match decl {
            Declaration::Function(f) => {
                let param_types = f.params.iter().map(|p| resolve_type_ref(&p.declared_type, symbols, types)).collect();
                let return_type = f
                    .return_type
                    .as_ref()
                    .map(|t| resolve_type_ref(t, symbols, types))
                    .unwrap_or_else(|| types.predefined().void);
                symbols.declare_method(MethodSymbol {
                    qualified_name: f.name.clone(),
                    class_name: String::new(),
                    method_name: f.name.clone(),
                    param_types,
                    return_type,
                    is_static: true,
                    is_virtual: false,
                    is_override: false,
                    is_constructor: false,
                    is_destructor: false,
                    vtable_slot: None,
                    is_forward_declared: f.body.is_none(),
                    is_defined: f.body.is_some(),
                    declared_line: 0,
                });
            }
            Declaration::Namespace(ns) => register_free_functions(&ns.members, symbols, types),
            _ => {}
        }
    }
}

fn register_class(
    type_decl: &TypeDecl,
    symbols: &mut SymbolTable,
    types: &TypeSystem,
    diagnostics: &mut DiagnosticEngine,
    spans: &SpanMap,
    file_name: &str,
) {
    let _ = file_name;
    let symbol_id = symbols.allocate_symbol_id();
    let mut field_names = Vec::new();
    let mut index = 0u32;
    for member in &type_decl.members {
        if let Declaration::MemberVariable(mv) = member {
            field_names.push(FieldInfo {
                name: mv.name.clone(),
                ast_type: mv.declared_type.clone(),
                index,
                declared_in: type_decl.name.clone(),
            });
            index += 1;
        }
    }
    let declared_line = spans.get_or_unknown(type_decl.id).line;
    symbols.declare_class(ClassSymbol {
        symbol_id,
        name: type_decl.name.clone(),
        qualified_name: type_decl.name.clone(),
        base: type_decl.base.clone(),
        field_names,
        base_field_aliases: std::collections::HashMap::new(),
        virtual_method_order: Vec::new(),
        is_forward_declared: false,
        is_defined: true,
        declared_line,
    });

    let mut next_slot = symbols
        .find_class(&type_decl.name)
        .map(|c| c.virtual_method_order.len() as u32)
        .unwrap_or(0);

    for member in &type_decl.members {
        match member {
            Declaration::Function(f) => {
                let qualified = format!("{}.{}", type_decl.name, f.name);
                let span = spans.get_or_unknown(f.id);

                let vtable_slot = if f.modifiers.is_virtual {
                    let slot = next_slot;
                    next_slot += 1;
                    if let Some(c) = symbols.find_class_mut(&type_decl.name) {
                        c.virtual_method_order.push(qualified.clone());
                    }
                    Some(slot)
                } else if f.modifiers.is_override {
                    let base_slot = type_decl.base.as_ref().and_then(|base_name| {
                        symbols.find_method_in_class(base_name, &f.name).and_then(|m| m.vtable_slot)
                    });
                    if base_slot.is_none() {
                        diagnostics.override_of_non_virtual(&f.name, &type_decl.name, span.clone());
                    }
                    base_slot
                } else {
                    None
                };

                let param_types = f.params.iter().map(|p| resolve_type_ref(&p.declared_type, symbols, types)).collect();
                let return_type = f
                    .return_type
                    .as_ref()
                    .map(|t| resolve_type_ref(t, symbols, types))
                    .unwrap_or_else(|| types.predefined().void);

                symbols.declare_method(MethodSymbol {
                    qualified_name: qualified,
                    class_name: type_decl.name.clone(),
                    method_name: f.name.clone(),
                    param_types,
                    return_type,
                    is_static: f.modifiers.is_static,
                    is_virtual: f.modifiers.is_virtual,
                    is_override: f.modifiers.is_override,
                    is_constructor: false,
                    is_destructor: false,
                    vtable_slot,
                    is_forward_declared: f.body.is_none(),
                    is_defined: f.body.is_some(),
                    declared_line: span.line,
                });
            }
            Declaration::Constructor(ctor) => {
                let qualified = format!("{}.<ctor>", type_decl.name);
                let span = spans.get_or_unknown(ctor.id);
                let param_types = ctor.params.iter().map(|p| resolve_type_ref(&p.declared_type, symbols, types)).collect();
                symbols.declare_method(MethodSymbol {
                    qualified_name: qualified,
                    class_name: type_decl.name.clone(),
                    method_name: "<ctor>".to_string(),
                    param_types,
                    return_type: types.predefined().void,
                    is_static: false,
                    is_virtual: false,
                    is_override: false,
                    is_constructor: true,
                    is_destructor: false,
                    vtable_slot: None,
                    is_forward_declared: false,
                    is_defined: true,
                    declared_line: span.line,
                });
            }
            Declaration::Destructor(dtor) => {
                let qualified = format!("{}.<dtor>", type_decl.name);
                let span = spans.get_or_unknown(dtor.id);
                // Destructors always occupy physical vtable slot 0
                // (§4.6 Pass 3); they are not part of `virtual_method_order`,
                // which indexes only the 1.. virtual-method slots.
                symbols.declare_method(MethodSymbol {
                    qualified_name: qualified,
                    class_name: type_decl.name.clone(),
                    method_name: "<dtor>".to_string(),
                    param_types: Vec::new(),
                    return_type: types.predefined().void,
                    is_static: false,
                    is_virtual: true,
                    is_override: false,
                    is_constructor: false,
                    is_destructor: true,
                    vtable_slot: None,
                    is_forward_declared: false,
                    is_defined: true,
                    declared_line: span.line,
                });
            }
            _ => {}
        }
    }
}
