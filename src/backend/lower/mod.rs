//! Syntax tree → target lowering pass.
//!
//! A single depth-first walk that resolves every name against a [`ScopeStack`] and asks an [`Emitter`] for target
//! fragments. Semantic checks and emission happen in the same pass: the first semantic error aborts the unit.
//!
//! # Architecture
//!
//! - `stmt` - Statement lowering (assignment, control flow, module boundary)
//! - `expr` - Expression lowering (literals, operator chains, rvalue chains, calls, function literals)
//!
//! # Declaration hoisting
//!
//! A name first assigned in a frame needs a storage declaration before its first use. Lowering drains the frame's
//! pending names after each statement of a frame-owning statement list (program, function body, `var` block, loop
//! body) and places the declaration right before that statement. `if` branch bodies own no frame, so names first
//! assigned in a branch are declared before the whole `if`.
//!
//! # Usage
//!
//! ```rust
//! use pac::backend::emit::CppEmitter;
//! use pac::backend::lower::Lowering;
//! use pac_syntax::ast::{Expr, Program, Statement};
//!
//! let program = Program::new(vec![Statement::assign_expr("x", Expr::int(1))]);
//! let mut emitter = CppEmitter::new();
//! let mut lowering = Lowering::new(&mut emitter, ["print"]);
//! let body = lowering.lower_program(&program).unwrap();
//! assert_eq!(body.len(), 2); // declaration + assignment
//! ```

mod expr;
mod stmt;

use pac_syntax::ast::{Program, Spanned, Statement};

use super::emit::Emitter;
use crate::semantics::{LinkTable, ScopeStack, SemanticError};

/// Lowering context for one compilation unit.
///
/// A lowering that returned an error is left mid-walk and must be discarded.
pub struct Lowering<'e, E: Emitter> {
    pub(super) scopes: ScopeStack,
    pub(super) emitter: &'e mut E,
    /// Nesting depth of `if` branch bodies, which share their enclosing frame.
    pub(super) branch_depth: usize,
}

impl<'e, E: Emitter> Lowering<'e, E> {
    /// Create a lowering whose global frame holds `intrinsics`.
    pub fn new<I, S>(emitter: &'e mut E, intrinsics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: ScopeStack::new(intrinsics),
            emitter,
            branch_depth: 0,
        }
    }

    /// Lower the top-level statements of a unit, in order.
    pub fn lower_program(&mut self, program: &Program) -> Result<Vec<E::Fragment>, SemanticError> {
        tracing::debug!(statements = program.statements.len(), "lowering program");
        self.lower_frame_body(&program.statements)
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// The import/export table collected while lowering.
    pub fn into_links(self) -> LinkTable {
        self.scopes.into_links()
    }

    /// Lower a statement list that owns the current frame, hoisting storage declarations.
    pub(super) fn lower_frame_body(
        &mut self,
        stmts: &[Spanned<Statement>],
    ) -> Result<Vec<E::Fragment>, SemanticError> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let fragments = self.lower_statement(stmt)?;
            let pending = self.scopes.flush_pending_declarations();
            if !pending.is_empty() {
                tracing::trace!(?pending, "declare");
                out.push(self.emitter.declare(&pending));
            }
            out.extend(fragments);
        }
        Ok(out)
    }

    /// Lower an `if` branch body. Declarations are left pending for the enclosing statement list.
    pub(super) fn lower_branch_body(
        &mut self,
        stmts: &[Spanned<Statement>],
    ) -> Result<Vec<E::Fragment>, SemanticError> {
        self.branch_depth += 1;
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            out.extend(self.lower_statement(stmt)?);
        }
        self.branch_depth -= 1;
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
