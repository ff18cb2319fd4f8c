//! Syntax tree contract for the Pa language.
//!
//! The front-end (lexer + parser) lives outside this workspace. It hands the compiler a [`ast::Program`], either
//! in-process or serialized with serde (the CLI reads JSON). This crate is the single definition of that contract.
//!
//! ## Notes
//! - This crate is intentionally “syntax-only”: it does not do name resolution or lowering.
//! - Trees are immutable for a compilation run; nothing in the compiler mutates them.
//!
//! ## Examples
//! ```rust
//! use pac_syntax::ast::{Expr, Program, Statement};
//!
//! // x = 1 + 2;
//! let program = Program::new(vec![Statement::assign_expr("x", Expr::binary(Expr::int(1), "+", Expr::int(2)))]);
//! assert_eq!(program.statements.len(), 1);
//! ```

pub mod ast;
