//! Three-pass LLVM-IR code generator (C6, §4.6).
//!
//! Pass 1 ([`structure`]) declares every class's fields struct, vtable
//! type and global, and every function/method signature. Pass 2
//! ([`bodies`]) fills in method/function/constructor/destructor bodies.
//! Pass 3 ([`vtable`]) assembles each vtable global's constant
//! initializer, once every method it might point to has a defined
//! `FunctionValue`. Splitting structure from bodies is what lets a
//! method call forward-reference a class declared later in the same
//! file — by the time any body is generated every signature already
//! exists in the module.

mod bodies;
pub mod error;
mod expressions;
pub mod mangling;
mod object;
pub mod runtime;
mod statements;
mod structure;
pub mod types;
mod vtable;

pub use error::{CodegenError, CodegenResult};
pub use runtime::RuntimeFunctions;

use crate::scope_manager::ScopeManager;
use crate::semantic::SemanticIR;
use glint_ast::{CompilationUnit, TypeId};
use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::StructType;
use inkwell::values::{FunctionValue, GlobalValue, PointerValue};
use std::collections::HashMap;

/// Per-class structural facts Pass 1 records for Pass 2/3 to consume.
pub(crate) struct ClassLayout<'ctx> {
    pub fields_struct: StructType<'ctx>,
    pub has_vtable: bool,
    pub vtable_struct: Option<StructType<'ctx>>,
    pub vtable_global: Option<GlobalValue<'ctx>>,
}

pub struct Codegen<'ctx, 'ir> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub ir: &'ir SemanticIR,
    pub runtime: RuntimeFunctions<'ctx>,
    pub(crate) classes: HashMap<String, ClassLayout<'ctx>>,
    pub(crate) functions: HashMap<String, FunctionValue<'ctx>>,
    pub(crate) scope: ScopeManager<'ctx>,
    /// Stack of block-local variable frames, pushed/popped in lockstep
    /// with `scope`. Name resolution walks it innermost-first, mirroring
    /// `SymbolTable::find_variable` (§4.4) — but codegen needs the
    /// LLVM `alloca`, not the type, so it keeps its own.
    pub(crate) locals: Vec<HashMap<String, (PointerValue<'ctx>, TypeId)>>,
    pub(crate) current_class: Option<String>,
    pub(crate) current_return_type: Option<TypeId>,
    /// `{ exit_block, continue_block }` per enclosing loop (§4.7), for
    /// `break`/`continue` target resolution.
    pub(crate) loop_stack: Vec<(BasicBlock<'ctx>, BasicBlock<'ctx>)>,
}

impl<'ctx, 'ir> Codegen<'ctx, 'ir> {
    fn new(context: &'ctx Context, module_name: &str, ir: &'ir SemanticIR) -> Self {
        let module = context.create_module(module_name);
        let runtime = RuntimeFunctions::declare(context, &module);
        Codegen {
            context,
            module,
            builder: context.create_builder(),
            ir,
            runtime,
            classes: HashMap::new(),
            functions: HashMap::new(),
            scope: ScopeManager::new(),
            locals: Vec::new(),
            current_class: None,
            current_return_type: None,
            loop_stack: Vec::new(),
        }
    }

    pub(crate) fn push_block_scope(&mut self, kind: crate::scope_manager::ScopeKind, name: impl Into<String>) {
        self.scope.push_scope(kind, name);
        self.locals.push(HashMap::new());
    }

    pub(crate) fn pop_block_scope(&mut self) -> CodegenResult<()> {
        self.scope
            .pop_scope(&self.builder, self.context.ptr_type(inkwell::AddressSpace::default()), self.runtime.object_release)
            .map_err(|e| CodegenError::internal("pop_block_scope", e))?;
        self.locals.pop();
        Ok(())
    }

    pub(crate) fn declare_local(&mut self, name: &str, ptr: PointerValue<'ctx>, ty: TypeId) {
        if let Some(frame) = self.locals.last_mut() {
            frame.insert(name.to_string(), (ptr, ty));
        }
    }

    pub(crate) fn find_local(&self, name: &str) -> Option<(PointerValue<'ctx>, TypeId)> {
        self.locals.iter().rev().find_map(|frame| frame.get(name).copied())
    }
}

/// Run all three passes over `unit` and hand back the completed module.
/// Requires `ir.has_errors` to be `false` — codegen never runs over a
/// compilation unit that failed semantic analysis (§4.6).
pub fn compile_unit<'ctx>(
    context: &'ctx Context,
    module_name: &str,
    unit: &CompilationUnit,
    ir: &SemanticIR,
) -> CodegenResult<Module<'ctx>> {
    if ir.has_errors {
        return Err(CodegenError::SemanticErrorsPresent);
    }

    let mut codegen = Codegen::new(context, module_name, ir);
    log::debug!(target: "glint_compiler::codegen", "pass 1: structure & signatures");
    structure::run(&mut codegen, unit)?;
    log::debug!(target: "glint_compiler::codegen", "pass 2: bodies");
    bodies::run(&mut codegen, unit)?;
    log::debug!(target: "glint_compiler::codegen", "pass 3: vtables");
    vtable::run(&mut codegen, unit)?;

    if let Err(message) = codegen.module.verify() {
        return Err(CodegenError::VerificationFailed(message.to_string()));
    }

    Ok(codegen.module)
}
