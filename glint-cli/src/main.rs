//! Thin demonstration harness (§10.5): the one place in the workspace
//! that reads a file, installs `env_logger`, and drives
//! lex → parse → analyze → codegen → JIT/AOT end to end. Not part of
//! the compiler's own contract — every crate it calls into is usable
//! without this binary existing.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use glint_compiler::jit::{self, CompileOptions, JitHost};
use inkwell::context::Context;
use inkwell::OptimizationLevel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glint")]
#[command(version)]
#[command(about = "Glint language compiler driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, analyze, codegen, and JIT-execute a source file's `Main` entry point.
    Run {
        /// Input source file.
        input: PathBuf,

        #[command(flatten)]
        opts: OptArgs,
    },

    /// Parse, analyze, and codegen a source file, writing an AOT object file.
    EmitObject {
        /// Input source file.
        input: PathBuf,

        /// Output object file path (defaults to the input's stem with a `.o` extension).
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        opts: OptArgs,
    },
}

#[derive(clap::Args)]
struct OptArgs {
    /// Optimization level, 0-3.
    #[arg(short = 'O', long, default_value = "2")]
    opt_level: u8,

    /// Override the target triple (emit-object only; defaults to the host triple).
    #[arg(long)]
    target: Option<String>,
}

fn optimization_level(level: u8) -> OptimizationLevel {
    match level {
        0 => OptimizationLevel::None,
        1 => OptimizationLevel::Less,
        3 => OptimizationLevel::Aggressive,
        _ => OptimizationLevel::Default,
    }
}

/// Runs lex → parse → analyze, printing every diagnostic. Returns the
/// parsed unit and its semantic IR, or bails if analysis found errors.
fn compile_front_end(input: &PathBuf) -> Result<(glint_ast::CompilationUnit, glint_compiler::SemanticIR)> {
    let file_name = input.to_string_lossy().to_string();
    let source = std::fs::read_to_string(input)?;

    let (tokens, lex_diagnostics) = glint_lexer::tokenize(&source, &file_name, glint_lexer::LexOptions::default());
    for d in &lex_diagnostics {
        eprintln!("{}", d.format(&source));
    }

    let (unit, spans, parse_diagnostics) = glint_parser::parse(tokens, &file_name);
    for d in &parse_diagnostics {
        eprintln!("{}", d.format(&source));
    }
    if !lex_diagnostics.is_empty() || !parse_diagnostics.is_empty() {
        bail!("lexing/parsing failed for {file_name}");
    }

    let ir = glint_compiler::analyze(&unit, &spans, &file_name);
    for d in ir.diagnostics.diagnostics() {
        eprintln!("{}", d.format(&source));
    }
    if ir.has_errors {
        bail!("semantic analysis reported errors for {file_name}");
    }

    Ok((unit, ir))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { input, opts } => {
            log::info!("running {}", input.display());
            let (unit, ir) = compile_front_end(&input)?;

            let context = Context::create();
            let module_name = input.file_stem().and_then(|s| s.to_str()).unwrap_or("glint_module");
            let module = glint_compiler::compile_unit(&context, module_name, &unit, &ir)?;

            let options = CompileOptions {
                optimization_level: optimization_level(opts.opt_level),
                ..CompileOptions::default()
            };
            let host = JitHost::new(module, options.optimization_level)?;
            let exit_code = host.call_i32("Main")?;
            println!("{exit_code}");
            std::process::exit(exit_code);
        }

        Commands::EmitObject { input, output, opts } => {
            log::info!("compiling {} to an object file", input.display());
            let (unit, ir) = compile_front_end(&input)?;

            let context = Context::create();
            let module_name = input.file_stem().and_then(|s| s.to_str()).unwrap_or("glint_module");
            let module = glint_compiler::compile_unit(&context, module_name, &unit, &ir)?;

            let output_path = output.unwrap_or_else(|| input.with_extension("o"));
            let options = CompileOptions {
                optimization_level: optimization_level(opts.opt_level),
                target_triple: opts.target,
                ..CompileOptions::default()
            };
            jit::compile_to_object(&module, &options, &output_path)?;
            println!("wrote {}", output_path.display());
            Ok(())
        }
    }
}
