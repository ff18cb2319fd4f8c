//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;

use pac_core::lang::intrinsics::DEFAULT_INTRINSICS;
use pac_syntax::ast::Program;

use super::{CliError, CliResult, ExitCode};
use crate::backend::{CompileError, Compiler};
use crate::config::CompileOptions;
use crate::diagnostics;
use crate::semantics::Linkage;

// ============================================================================
// Input loading
// ============================================================================

/// Read and deserialize a syntax tree file.
pub fn load_tree(path: &Path) -> CliResult<Program> {
    let json = fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", path.display(), e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CliError::failure(format!("Error parsing syntax tree {}: {}", path.display(), e)))
}

/// Read the optional Pa source used for error context.
fn load_source(path: Option<&Path>) -> CliResult<Option<(String, String)>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", path.display(), e)))?;
    Ok(Some((path.display().to_string(), text)))
}

/// Turn a compile error into a rendered CLI error.
fn compile_failure(error: CompileError, source: Option<&Path>) -> CliError {
    // A missing source file should not hide the real error.
    let source = load_source(source).ok().flatten();
    let report = diagnostics::report(error, source.as_ref().map(|(name, text)| (name.as_str(), text.clone())));
    CliError::new(format!("{report:?}"), ExitCode::COMPILE_ERROR)
}

// ============================================================================
// Commands
// ============================================================================

/// Compile a tree and write the target source to `output` (or stdout).
pub fn emit_file(
    tree: &Path,
    output: Option<&Path>,
    source: Option<&Path>,
    options: CompileOptions,
) -> CliResult<ExitCode> {
    let program = load_tree(tree)?;
    let backend = options.backend;
    let code = Compiler::new(options)
        .compile(&program)
        .map_err(|e| compile_failure(e, source))?;

    match output {
        Some(path) => {
            fs::write(path, &code)
                .map_err(|e| CliError::failure(format!("Error writing {}: {}", path.display(), e)))?;
            tracing::info!(%backend, output = %path.display(), "emitted module");
        }
        None => print!("{code}"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Analyse a tree and print its import/export table.
pub fn check_file(tree: &Path, source: Option<&Path>, options: CompileOptions) -> CliResult<ExitCode> {
    let program = load_tree(tree)?;
    let links = Compiler::new(options)
        .check(&program)
        .map_err(|e| compile_failure(e, source))?;

    println!("✓ {} is well-formed", tree.display());
    for entry in links.entries() {
        match entry.linkage {
            Linkage::Import => println!("  import {} as {}", entry.foreign, entry.local),
            Linkage::Export => println!("  export {} as {}", entry.local, entry.foreign),
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Print the default intrinsic set.
pub fn list_intrinsics() -> CliResult<ExitCode> {
    for info in DEFAULT_INTRINSICS {
        println!("{:<8} {}", info.name, info.summary);
    }
    Ok(ExitCode::SUCCESS)
}
