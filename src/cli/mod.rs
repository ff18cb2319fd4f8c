//! CLI module for the Pa compiler
//!
//! This module provides the command-line interface for the compiler. The front-end (lexer and parser) is not part
//! of this crate: the CLI consumes syntax trees serialized as JSON by an external parser.
//!
//! ## Commands
//!
//! - `emit <tree.json>` - Compile a tree to Rust or C++ source
//! - `check <tree.json>` - Run semantic analysis only and print the import/export table
//! - `intrinsics` - List the default intrinsic names
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::config::{BackendKind, CompileOptions};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The tree compiled into nothing because it is semantically invalid.
    pub const COMPILE_ERROR: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// The Pa programming language compiler
#[derive(Parser, Debug)]
#[command(name = "pac")]
#[command(version = VERSION)]
#[command(about = "The Pa programming language compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a syntax tree to target source
    Emit {
        /// Syntax tree (JSON) to compile
        #[arg(value_name = "TREE")]
        tree: PathBuf,
        /// Write the output here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Compile as a library (no entry point)
        #[arg(long)]
        library: bool,
        /// Target language
        #[arg(long, value_name = "BACKEND", default_value_t = BackendKind::Rust)]
        backend: BackendKind,
        /// Module name recorded in the output (default: the tree file stem)
        #[arg(long, value_name = "NAME")]
        module_name: Option<String>,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Check a syntax tree without emitting code
    Check {
        /// Syntax tree (JSON) to check
        #[arg(value_name = "TREE")]
        tree: PathBuf,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// List the default intrinsics
    Intrinsics,
}

/// Flags shared by every command that analyses a tree.
#[derive(Args, Debug, Default)]
pub struct AnalysisArgs {
    /// Additional intrinsic name (repeatable)
    #[arg(long = "intrinsic", value_name = "NAME")]
    pub intrinsics: Vec<String>,
    /// Start from an empty intrinsic set instead of the defaults
    #[arg(long)]
    pub no_default_intrinsics: bool,
    /// Pa source the tree was parsed from, used to show error context
    #[arg(long, value_name = "FILE")]
    pub source: Option<PathBuf>,
}

impl AnalysisArgs {
    fn options(&self) -> CompileOptions {
        let mut options = CompileOptions::default();
        if self.no_default_intrinsics {
            options = options.with_intrinsics(Vec::<String>::new());
        }
        for name in &self.intrinsics {
            options = options.with_intrinsic(name.clone());
        }
        options
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Emit {
            tree,
            output,
            library,
            backend,
            module_name,
            analysis,
        } => {
            let module_name = module_name.or_else(|| file_stem(&tree));
            let mut options = analysis.options().library(library).with_backend(backend);
            if let Some(name) = module_name {
                options = options.with_module_name(name);
            }
            commands::emit_file(&tree, output.as_deref(), analysis.source.as_deref(), options)
        }
        Command::Check { tree, analysis } => {
            commands::check_file(&tree, analysis.source.as_deref(), analysis.options())
        }
        Command::Intrinsics => commands::list_intrinsics(),
    }
}

/// `lib.tree.json` → `lib`
fn file_stem(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    if stem.is_empty() { None } else { Some(stem.to_string()) }
}

// ============================================================================
// Tests
// ============================================================================
