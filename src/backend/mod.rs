//! Pa compiler backend
//!
//! This module turns a Pa syntax tree into target source code.
//!
//! The pipeline is:
//! 1. Syntax tree from the front-end → `Lowering` (scope resolution + semantic checks)
//! 2. `Lowering` drives an `Emitter`, which builds target fragments bottom-up
//! 3. `Emitter::finish_module` wraps the fragments into a module with intrinsic bindings, exports and an entry point
//!
//! ## Module Organization
//!
//! - `lower/` - Statement and expression lowering over the scope stack
//! - `emit/` - The `Emitter` trait and the Rust and C++ emitters
//! - `codegen.rs` - `Compiler`, the driver tying options, lowering and emission together

#![deny(clippy::unwrap_used)]

pub mod codegen;
pub mod emit;
pub mod lower;

pub use codegen::{CompileError, Compiler};
pub use emit::{CppEmitter, Emitter, RustEmitter};
pub use lower::Lowering;
