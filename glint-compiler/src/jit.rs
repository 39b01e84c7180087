//! JIT host and AOT object emission (C7 "JIT Host" half, §4.7).
//!
//! Initializes the native target once per process, takes ownership of a
//! finished module, and exposes either an on-demand execution engine
//! (JIT) or a target-machine object-file sink (AOT). Grounded on the
//! teacher's `compile_to_object_with_opt` for the AOT path; the JIT path
//! has no teacher precedent (the teacher only ever writes object files),
//! so it follows `inkwell`'s own `ExecutionEngine` the way the rest of
//! this pack's LLVM-backed crates use it.

use crate::codegen::{CodegenError, CodegenResult};
use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Module;
use inkwell::targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::OptimizationLevel;
use std::path::Path;
use std::sync::Once;

static INIT_NATIVE_TARGET: Once = Once::new();

fn ensure_native_target_initialized() -> CodegenResult<()> {
    let mut init_err = None;
    INIT_NATIVE_TARGET.call_once(|| {
        if let Err(e) = Target::initialize_native(&InitializationConfig::default()) {
            init_err = Some(e);
        }
    });
    match init_err {
        Some(e) => Err(CodegenError::Backend(format!("failed to initialize native target: {e}"))),
        None => Ok(()),
    }
}

/// Compilation-wide configuration (§10.3), passed by value into the
/// pipeline entry point rather than kept as global mutable state.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub tab_width: u32,
    pub retain_trivia: bool,
    pub optimization_level: OptimizationLevel,
    /// Target triple for the AOT path; `None` means the host triple.
    pub target_triple: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            tab_width: 4,
            retain_trivia: true,
            optimization_level: OptimizationLevel::Default,
            target_triple: None,
        }
    }
}

/// Owns the module's `ExecutionEngine` once it has been handed off for
/// JIT execution. §4.7: "LLVM context/module are moved into the
/// JIT/AOT sink; the caller cannot use them afterward."
pub struct JitHost<'ctx> {
    engine: ExecutionEngine<'ctx>,
}

impl<'ctx> JitHost<'ctx> {
    /// Builds an on-demand execution engine over `module`. The runtime
    /// library's `Object_*`/`String_*` symbols resolve automatically —
    /// `glint-runtime` is linked as a normal `rlib` into whatever binary
    /// embeds this compiler, so they're already present in the host
    /// process's own symbol table, which `ExecutionEngine` consults by
    /// default when an external declaration has no module-local
    /// definition.
    pub fn new(module: Module<'ctx>, opt_level: OptimizationLevel) -> CodegenResult<Self> {
        ensure_native_target_initialized()?;
        let engine = module
            .create_jit_execution_engine(opt_level)
            .map_err(|e| CodegenError::Backend(format!("failed to create JIT execution engine: {e}")))?;
        Ok(JitHost { engine })
    }

    /// Looks up and calls a zero-argument, `i32`-returning function —
    /// the shape of every §8 end-to-end scenario's `Main` entry point.
    pub fn call_i32(&self, function_name: &str) -> CodegenResult<i32> {
        type MainFn = unsafe extern "C" fn() -> i32;
        let function = unsafe {
            self.engine
                .get_function::<MainFn>(function_name)
                .map_err(|e| CodegenError::Backend(format!("failed to resolve `{function_name}`: {e}")))?
        };
        Ok(unsafe { function.call() })
    }

    /// Looks up and calls a zero-argument function returning a raw
    /// `ptr` — an entry point that hands back a `GlintString*` (§8
    /// scenario 4) rather than an `i32`.
    pub fn call_ptr(&self, function_name: &str) -> CodegenResult<*mut u8> {
        type MainFn = unsafe extern "C" fn() -> *mut u8;
        let function = unsafe {
            self.engine
                .get_function::<MainFn>(function_name)
                .map_err(|e| CodegenError::Backend(format!("failed to resolve `{function_name}`: {e}")))?
        };
        Ok(unsafe { function.call() })
    }
}

/// AOT path (§4.7): the same module lowered through a target machine to
/// an object file, using the host triple and CPU features unless
/// `options.target_triple` overrides it.
pub fn compile_to_object(module: &Module, options: &CompileOptions, output_path: &Path) -> CodegenResult<()> {
    ensure_native_target_initialized()?;

    let target_triple = match &options.target_triple {
        Some(triple) => inkwell::targets::TargetTriple::create(triple),
        None => TargetMachine::get_default_triple(),
    };
    let target = Target::from_triple(&target_triple).map_err(|e| CodegenError::Backend(format!("failed to resolve target triple: {e}")))?;
    let cpu = TargetMachine::get_host_cpu_name();
    let features = TargetMachine::get_host_cpu_features();

    let target_machine = target
        .create_target_machine(
            &target_triple,
            cpu.to_str().unwrap_or("generic"),
            features.to_str().unwrap_or(""),
            options.optimization_level,
            RelocMode::Default,
            CodeModel::Default,
        )
        .ok_or_else(|| CodegenError::Backend("failed to create target machine".to_string()))?;

    target_machine
        .write_to_file(module, FileType::Object, output_path)
        .map_err(|e| CodegenError::Backend(format!("failed to write object file: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_host_triple_and_default_opt() {
        let options = CompileOptions::default();
        assert!(options.target_triple.is_none());
        assert_eq!(options.optimization_level, OptimizationLevel::Default);
        assert_eq!(options.tab_width, 4);
        assert!(options.retain_trivia);
    }
}
