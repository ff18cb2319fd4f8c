//! Expression lowering.
//!
//! Operator chains arrive precedence-resolved and are folded strictly left-to-right. Rvalue chains read their root
//! through the scope stack (recording closure captures) and apply suffixes in order.

use pac_core::lang::operators::{self, OperatorId};
use pac_syntax::ast::{Block, CallArg, Chain, Expr, Literal, Param, Statement, Suffix};

use super::Lowering;
use crate::backend::emit::{BlockParts, Emitter, FunctionParts, ParamParts};
use crate::semantics::SemanticError;
use crate::semantics::errors::source_span;

impl<E: Emitter> Lowering<'_, E> {
    pub(super) fn lower_expr(&mut self, expr: &Expr) -> Result<E::Fragment, SemanticError> {
        match expr {
            Expr::Literal(lit) => self.lower_literal(lit),
            Expr::Unary { op, operand } => match operators::unary_from_str(&op.node) {
                Some(OperatorId::Not) => {
                    let operand = self.lower_expr(operand)?;
                    Ok(self.emitter.not(operand))
                }
                _ => Err(SemanticError::UnsupportedUnary {
                    op: op.node.clone(),
                    span: source_span(op.span),
                }),
            },
            Expr::Chain { first, rest } => {
                let mut acc = self.lower_expr(first)?;
                for tail in rest {
                    let Some(id) = operators::binary_from_str(&tail.op.node) else {
                        return Err(SemanticError::UnknownOperator {
                            op: tail.op.node.clone(),
                            span: source_span(tail.op.span),
                        });
                    };
                    let rhs = self.lower_expr(&tail.operand)?;
                    acc = self.emitter.binary(id, acc, rhs);
                }
                Ok(acc)
            }
        }
    }

    fn lower_literal(&mut self, lit: &Literal) -> Result<E::Fragment, SemanticError> {
        Ok(match lit {
            Literal::Bool(b) => self.emitter.boolean(*b),
            Literal::Nil => self.emitter.nil(),
            Literal::Integer(n) => self.emitter.integer(*n),
            Literal::Real(r) => self.emitter.real(*r),
            Literal::String(s) => self.emitter.string(s),
            Literal::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.lower_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                self.emitter.list(items)
            }
            Literal::Dict(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.lower_expr(key)?;
                    let value = self.lower_expr(value)?;
                    pairs.push((key, value));
                }
                self.emitter.dict(pairs)
            }
            Literal::Func(func) => self.lower_function(&func.params, &func.body, None)?,
            Literal::VarBlock(body) => self.lower_value_block(body)?,
            Literal::Rvalue(chain) => self.lower_rvalue(chain)?,
        })
    }

    /// Read a chain: resolve the root, then apply item, attribute and call suffixes in order.
    pub(super) fn lower_rvalue(&mut self, chain: &Chain) -> Result<E::Fragment, SemanticError> {
        self.scopes.resolve_read(&chain.root.node, chain.root.span)?;
        let mut acc = self.emitter.read_var(&chain.root.node);
        for suffix in &chain.suffixes {
            acc = self.apply_suffix(acc, suffix)?;
        }
        Ok(acc)
    }

    pub(super) fn apply_suffix(&mut self, base: E::Fragment, suffix: &Suffix) -> Result<E::Fragment, SemanticError> {
        Ok(match suffix {
            Suffix::Item(index) => {
                let index = self.lower_expr(index)?;
                self.emitter.item(base, index)
            }
            Suffix::Attr(name) => self.emitter.attr(base, name),
            Suffix::Call(args) => {
                // Positional arguments are evaluated before keyword arguments.
                let mut positional = Vec::new();
                for arg in args {
                    if let CallArg::Positional(value) = arg {
                        positional.push(self.lower_expr(value)?);
                    }
                }
                let mut keywords = Vec::new();
                for arg in args {
                    if let CallArg::Keyword { name, value } = arg {
                        keywords.push((name.clone(), self.lower_expr(value)?));
                    }
                }
                self.emitter.call(base, positional, keywords)
            }
        })
    }

    /// Lower a function literal in a fresh closure frame.
    ///
    /// `target` is the variable the function is being stored into, when the assignment target is a plain identifier.
    /// If the body reads that variable, the function is emitted as self-referencing instead of capturing it.
    pub(super) fn lower_function(
        &mut self,
        params: &[Param],
        body: &Block,
        target: Option<&str>,
    ) -> Result<E::Fragment, SemanticError> {
        self.scopes.enter_closure_scope();
        let mut lowered = Vec::with_capacity(params.len());
        for param in params {
            // Defaults see the parameters declared before them.
            let default = match &param.default {
                Some(expr) => Some(self.lower_expr(expr)?),
                None => None,
            };
            if !self.scopes.bind(&param.name.node, false, param.name.span)? {
                return Err(SemanticError::DuplicateParameter {
                    name: param.name.node.clone(),
                    span: source_span(param.name.span),
                });
            }
            lowered.push(ParamParts {
                name: param.name.node.clone(),
                default,
            });
        }
        let body = self.lower_frame_body(body)?;
        let mut captures = self.scopes.leave_closure_scope();

        let self_name = match target {
            Some(name) if captures.iter().any(|c| c == name) => {
                captures.retain(|c| c != name);
                Some(name.to_string())
            }
            _ => None,
        };
        tracing::trace!(?captures, ?self_name, "function literal");
        Ok(self.emitter.function(FunctionParts {
            params: lowered,
            body,
            captures,
            self_name,
        }))
    }

    /// Lower a `var` block. A block that only returns an expression is lowered as that expression.
    pub(super) fn lower_value_block(&mut self, body: &Block) -> Result<E::Fragment, SemanticError> {
        if let [only] = body.as_slice() {
            if let Statement::Return(expr) = &only.node {
                return self.lower_expr(expr);
            }
        }
        self.scopes.enter_closure_scope();
        let body = self.lower_frame_body(body)?;
        let captures = self.scopes.leave_closure_scope();
        Ok(self.emitter.value_block(BlockParts { body, captures }))
    }
}
