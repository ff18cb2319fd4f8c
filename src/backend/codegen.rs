//! Compilation driver.
//!
//! `Compiler` runs the whole pipeline for one unit:
//!
//! ```text
//! Program → Lowering (ScopeStack + Emitter) → fragments → Emitter::finish_module → target source
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pac::backend::Compiler;
//! use pac::config::CompileOptions;
//! use pac_syntax::ast::{Expr, Program, Statement};
//!
//! let program = Program::new(vec![Statement::assign_expr("x", Expr::binary(Expr::int(1), "+", Expr::int(2)))]);
//! let source = Compiler::new(CompileOptions::default()).compile(&program)?;
//! assert!(source.contains("x = __rt::add(Value::int(1), Value::int(2));"));
//! # Ok::<(), pac::backend::CompileError>(())
//! ```
//!
//! ## Error Handling
//!
//! Every failure is a [`CompileError`]: either a semantic error found while lowering (the first one aborts the unit)
//! or an emission error reported by the backend.

use miette::Diagnostic;
use pac_syntax::ast::Program;
use thiserror::Error;

use super::emit::{CppEmitter, EmitError, Emitter, ModuleParts, RustEmitter};
use super::lower::Lowering;
use crate::config::{BackendKind, CompileOptions};
use crate::semantics::{LinkTable, SemanticError};

/// Error while compiling a unit.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum CompileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Semantic(#[from] SemanticError),
    #[error("emission error: {0}")]
    #[diagnostic(code(pac::emission))]
    Emission(#[from] EmitError),
}

/// Compiles Pa syntax trees with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile with the backend named in the options.
    #[tracing::instrument(skip_all, fields(backend = %self.options.backend))]
    pub fn compile(&self, program: &Program) -> Result<String, CompileError> {
        match self.options.backend {
            BackendKind::Rust => self.compile_with(program, &mut RustEmitter::new()),
            BackendKind::Cpp => self.compile_with(program, &mut CppEmitter::new()),
        }
    }

    /// Compile with a caller-supplied emitter.
    #[tracing::instrument(skip_all, fields(statements = program.statements.len()))]
    pub fn compile_with<E: Emitter>(&self, program: &Program, emitter: &mut E) -> Result<String, CompileError> {
        let mut lowering = Lowering::new(emitter, self.options.intrinsics.iter().cloned());
        let body = lowering.lower_program(program)?;
        let links = lowering.into_links();
        tracing::debug!(
            imports = links.imports().count(),
            exports = links.exports().count(),
            "lowered unit"
        );

        let source = emitter.finish_module(ModuleParts {
            intrinsics: &self.options.intrinsics,
            links: &links,
            body,
            is_library: self.options.is_library,
            module_name: self.options.module_name.as_deref(),
        })?;
        Ok(source)
    }

    /// Run semantic analysis only and return the unit's import/export table.
    #[tracing::instrument(skip_all)]
    pub fn check(&self, program: &Program) -> Result<LinkTable, CompileError> {
        // The C++ emitter is the cheapest one to drive; its output is discarded.
        let mut emitter = CppEmitter::new();
        let mut lowering = Lowering::new(&mut emitter, self.options.intrinsics.iter().cloned());
        lowering.lower_program(program)?;
        Ok(lowering.into_links())
    }
}
