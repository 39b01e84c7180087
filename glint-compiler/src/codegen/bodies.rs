//! Pass 2 — bodies (§4.6): walk every class's methods, constructor, and
//! destructor, plus every free function, generating LLVM IR against the
//! signatures Pass 1 already declared.

use super::{Codegen, CodegenError, CodegenResult};
use crate::scope_manager::ScopeKind;
use glint_ast::{Block, CompilationUnit, ConstructorDecl, Declaration, DestructorDecl, Expression, FunctionDecl, ParameterDecl, TypeDecl};

pub(crate) fn run(cg: &mut Codegen, unit: &CompilationUnit) -> CodegenResult<()> {
    run_over(cg, &unit.declarations)
}

fn run_over(cg: &mut Codegen, decls: &[Declaration]) -> CodegenResult<()> {
    for decl in decls {
        match decl {
            Declaration::Type(type_decl) => generate_class_members(cg, type_decl)?,
            Declaration::Function(f) => generate_free_function(cg, f)?,
            Declaration::Namespace(ns) => run_over(cg, &ns.members)?,
            _ => {}
        }
    }
    Ok(())
}

fn generate_class_members(cg: &mut Codegen, type_decl: &TypeDecl) -> CodegenResult<()> {
    for member in &type_decl.members {
        match member {
            Declaration::Function(f) if f.body.is_some() => generate_method(cg, &type_decl.name, f)?,
            Declaration::Constructor(ctor) => generate_constructor(cg, type_decl, ctor)?,
            Declaration::Destructor(dtor) => generate_destructor(cg, &type_decl.name, dtor)?,
            _ => {}
        }
    }
    Ok(())
}

fn generate_method(cg: &mut Codegen, class_name: &str, f: &FunctionDecl) -> CodegenResult<()> {
    let qualified = format!("{class_name}.{}", f.name);
    let function = cg.functions.get(&qualified).copied().ok_or_else(|| CodegenError::MissingMethod(qualified.clone()))?;
    let method = cg.ir.symbols.find_method(&qualified).ok_or_else(|| CodegenError::MissingMethod(qualified.clone()))?.clone();
    let body = f.body.as_ref().ok_or_else(|| CodegenError::internal("generate_method", "method has no body despite Pass 1 declaring it"))?;

    let entry = cg.context.append_basic_block(function, "entry");
    cg.builder.position_at_end(entry);
    cg.current_class = if f.modifiers.is_static { None } else { Some(class_name.to_string()) };
    cg.current_return_type = Some(method.return_type);
    cg.push_block_scope(ScopeKind::Function, qualified.clone());

    bind_params(cg, function, &f.params, if f.modifiers.is_static { None } else { Some(class_name) })?;
    generate_block_body(cg, body, method.return_type)?;

    cg.current_class = None;
    Ok(())
}

fn generate_constructor(cg: &mut Codegen, type_decl: &TypeDecl, ctor: &ConstructorDecl) -> CodegenResult<()> {
    let qualified = format!("{}.<ctor>", type_decl.name);
    let function = cg.functions.get(&qualified).copied().ok_or_else(|| CodegenError::MissingMethod(qualified.clone()))?;

    let entry = cg.context.append_basic_block(function, "entry");
    cg.builder.position_at_end(entry);
    cg.current_class = Some(type_decl.name.clone());
    cg.current_return_type = None;
    cg.push_block_scope(ScopeKind::Function, qualified.clone());

    bind_params(cg, function, &ctor.params, Some(&type_decl.name))?;

    if let Some(base_name) = &type_decl.base {
        if let Some(base_args) = &ctor.base_call_args {
            call_base_constructor(cg, base_name, base_args)?;
        }
    }

    for stmt in &ctor.body.statements {
        cg.codegen_statement(stmt)?;
    }
    finish_with_terminator(cg, None)?;
    cg.current_class = None;
    Ok(())
}

fn call_base_constructor(cg: &mut Codegen, base_name: &str, args: &[Expression]) -> CodegenResult<()> {
    let ctor_name = format!("{base_name}.<ctor>");
    let Some(ctor) = cg.functions.get(&ctor_name).copied() else { return Ok(()) };
    let (this_ptr, _) = cg
        .find_local("this")
        .ok_or_else(|| CodegenError::internal("call_base_constructor", "constructor has no `this` binding"))?;
    let ptr_t = cg.context.ptr_type(inkwell::AddressSpace::default());
    let this_value = cg
        .builder
        .build_load(ptr_t, this_ptr, "this_for_base_ctor")
        .map_err(|e| CodegenError::builder("call_base_constructor", e))?;
    let mut call_args: Vec<inkwell::values::BasicMetadataValueEnum> = vec![this_value.into()];
    for a in args {
        call_args.push(cg.codegen_expr_value(a)?.into());
    }
    cg.builder
        .build_call(ctor, &call_args, "base_ctor_call")
        .map_err(|e| CodegenError::builder("call_base_constructor/call", e))?;
    Ok(())
}

fn generate_destructor(cg: &mut Codegen, class_name: &str, dtor: &DestructorDecl) -> CodegenResult<()> {
    let qualified = format!("{class_name}.<dtor>");
    let function = cg.functions.get(&qualified).copied().ok_or_else(|| CodegenError::MissingMethod(qualified.clone()))?;

    let entry = cg.context.append_basic_block(function, "entry");
    cg.builder.position_at_end(entry);
    cg.current_class = Some(class_name.to_string());
    cg.current_return_type = None;
    cg.push_block_scope(ScopeKind::Function, qualified.clone());

    bind_params(cg, function, &[], Some(class_name))?;
    for stmt in &dtor.body.statements {
        cg.codegen_statement(stmt)?;
    }
    finish_with_terminator(cg, None)?;
    cg.current_class = None;
    Ok(())
}

fn generate_free_function(cg: &mut Codegen, f: &FunctionDecl) -> CodegenResult<()> {
    let Some(body) = &f.body else { return Ok(()) };
    let function = cg.functions.get(&f.name).copied().ok_or_else(|| CodegenError::MissingMethod(f.name.clone()))?;
    let method = cg.ir.symbols.find_method(&f.name).ok_or_else(|| CodegenError::MissingMethod(f.name.clone()))?.clone();

    let entry = cg.context.append_basic_block(function, "entry");
    cg.builder.position_at_end(entry);
    cg.current_class = None;
    cg.current_return_type = Some(method.return_type);
    cg.push_block_scope(ScopeKind::Function, f.name.clone());

    bind_params(cg, function, &f.params, None)?;
    generate_block_body(cg, body, method.return_type)
}

fn generate_block_body(cg: &mut Codegen, body: &Block, return_type: glint_ast::TypeId) -> CodegenResult<()> {
    for stmt in &body.statements {
        cg.codegen_statement(stmt)?;
    }
    finish_with_terminator(cg, Some(return_type))
}

/// Allocate stack slots for `this` (if an instance context) and every
/// parameter, binding each to its LLVM argument value (§4.6 Pass 2).
fn bind_params(cg: &mut Codegen, function: inkwell::values::FunctionValue, params: &[ParameterDecl], instance_class: Option<&str>) -> CodegenResult<()> {
    let mut arg_index = 0;
    if let Some(class_name) = instance_class {
        let class = cg.ir.symbols.find_class(class_name).ok_or_else(|| CodegenError::MissingClass(class_name.to_string()))?;
        let this_ty = cg.ir.types.get_named(class.symbol_id);
        let arg = function.get_nth_param(arg_index).ok_or_else(|| CodegenError::internal("bind_params", "missing implicit `this` parameter"))?;
        let slot = cg
            .builder
            .build_alloca(cg.context.ptr_type(inkwell::AddressSpace::default()), "this")
            .map_err(|e| CodegenError::builder("bind_params/this_alloca", e))?;
        cg.builder.build_store(slot, arg).map_err(|e| CodegenError::builder("bind_params/this_store", e))?;
        cg.declare_local("this", slot, this_ty);
        arg_index += 1;
    }
    for param in params {
        let ty = crate::semantic::registration::resolve_type_ref(&param.declared_type, &cg.ir.symbols, &cg.ir.types);
        let llvm_ty = cg.llvm_type_of(ty)?;
        let arg = function
            .get_nth_param(arg_index)
            .ok_or_else(|| CodegenError::internal("bind_params", format!("missing parameter `{}`", param.name)))?;
        let slot = cg
            .builder
            .build_alloca(llvm_ty, &param.name)
            .map_err(|e| CodegenError::builder("bind_params/alloca", e))?;
        cg.builder.build_store(slot, arg).map_err(|e| CodegenError::builder("bind_params/store", e))?;
        // Parameters are borrowed, not owned: the caller retains ownership
        // of the argument and releases it at its own scope exit, so a
        // class-typed parameter is never ARC-registered here.
        cg.declare_local(&param.name, slot, ty);
        arg_index += 1;
    }
    Ok(())
}

/// Every function body must end in a terminator (P5 "SSA validity",
/// §4.6's per-function state machine). A body that falls off the end —
/// typically a `void` method with no explicit `return` — gets an
/// implicit one synthesized here, after the function-scope cleanup.
fn finish_with_terminator(cg: &mut Codegen, return_type: Option<glint_ast::TypeId>) -> CodegenResult<()> {
    let still_open = cg.builder.get_insert_block().map(|b| b.get_terminator().is_none()).unwrap_or(false);
    if !still_open {
        cg.locals.pop();
        cg.scope.pop_without_emitting();
        return Ok(());
    }
    let ptr_t = cg.context.ptr_type(inkwell::AddressSpace::default());
    cg.pop_block_scope()?;
    match return_type {
        None => {
            cg.builder.build_return(None).map_err(|e| CodegenError::builder("finish_with_terminator", e))?;
        }
        Some(ty) => {
            let is_void = matches!(cg.ir.types.get(ty), glint_ast::Type::Primitive(glint_ast::PrimitiveKind::Void));
            if is_void {
                cg.builder.build_return(None).map_err(|e| CodegenError::builder("finish_with_terminator", e))?;
            } else {
                let llvm_ty = cg.llvm_type_of(ty)?;
                let zero = llvm_ty.const_zero();
                cg.builder.build_return(Some(&zero)).map_err(|e| CodegenError::builder("finish_with_terminator", e))?;
            }
        }
    }
    let _ = ptr_t;
    Ok(())
}
