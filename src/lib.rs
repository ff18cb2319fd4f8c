#![forbid(unsafe_code)]
//! Pa Programming Language Compiler Core
//!
//! Pa is a small dynamically typed scripting language. This crate takes a parsed Pa syntax tree
//! ([`pac_syntax::ast::Program`]), resolves every name against lexically nested scopes, enforces Pa's mutability and
//! module-boundary rules, and emits target source code: Rust (against `pa_runtime`) or C++ (against `palang.h`).
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Generated code**: The emitters produce `.unwrap_or_else(..)` and `.clone()` calls as *output* tokens. These are
//!   part of the generated program, not method calls in the compiler.

pub mod backend;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod semantics;

pub use pac_syntax::ast;

pub use backend::{CompileError, Compiler};
pub use config::{BackendKind, CompileOptions};
pub use semantics::{LinkTable, SemanticError};
