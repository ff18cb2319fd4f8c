//! Statement lowering.
//!
//! Each statement lowers to zero or more fragments: `export` only touches the link table, an `import` with several
//! items yields one binding per item, everything else yields exactly one fragment.

use pac_syntax::ast::{
    AssignStmt, AssignValue, Chain, ClassDecl, ExportStmt, ForStmt, IfStmt, ImportStmt, Span, Spanned, Statement,
    Suffix, WhileStmt,
};

use super::Lowering;
use crate::backend::emit::{Emitter, Place};
use crate::semantics::SemanticError;
use crate::semantics::errors::source_span;

impl<E: Emitter> Lowering<'_, E> {
    pub(super) fn lower_statement(&mut self, stmt: &Spanned<Statement>) -> Result<Vec<E::Fragment>, SemanticError> {
        let fragment = match &stmt.node {
            Statement::Assign(assign) => self.lower_assign(assign)?,
            Statement::Expr(expr) => {
                let value = self.lower_expr(expr)?;
                self.emitter.expr_stmt(value)
            }
            Statement::For(f) => self.lower_for(f)?,
            Statement::While(w) => self.lower_while(w)?,
            Statement::Break => {
                self.scopes.check_loop_control("break", stmt.span)?;
                self.emitter.break_stmt()
            }
            Statement::Continue => {
                self.scopes.check_loop_control("continue", stmt.span)?;
                self.emitter.continue_stmt()
            }
            Statement::If(i) => self.lower_if(i)?,
            Statement::Return(expr) => {
                let value = self.lower_expr(expr)?;
                if self.scopes.in_unit_body() {
                    self.emitter.unit_return(value)
                } else {
                    self.emitter.return_stmt(value)
                }
            }
            Statement::Import(import) => return self.lower_import(import, stmt.span),
            Statement::Export(export) => {
                self.lower_export(export)?;
                return Ok(Vec::new());
            }
            Statement::Class(class) => return Err(Self::class_not_implemented(class)),
        };
        Ok(vec![fragment])
    }

    // ------------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------------

    /// `target = value`. The target is resolved before the value is lowered.
    fn lower_assign(&mut self, assign: &AssignStmt) -> Result<E::Fragment, SemanticError> {
        let place = self.lower_place(&assign.target)?;
        let value = match &assign.value {
            AssignValue::Block(body) => self.lower_value_block(body)?,
            AssignValue::Function { params, body } => {
                let target = assign.target.suffixes.is_empty().then_some(assign.target.root.node.as_str());
                self.lower_function(params, body, target)?
            }
        };
        Ok(self.emitter.assign(place, value))
    }

    /// Resolve an lvalue chain into a store location.
    ///
    /// The root is always resolved for writing, even when the store goes into an item or attribute of it.
    fn lower_place(&mut self, target: &Chain) -> Result<Place<E::Fragment>, SemanticError> {
        let root = &target.root;
        let invalid = || SemanticError::InvalidAssignTarget {
            name: root.node.clone(),
            span: source_span(root.span),
        };
        if target.suffixes.iter().any(|s| matches!(s, Suffix::Call(_))) {
            return Err(invalid());
        }
        self.scopes.resolve_write(&root.node, root.span)?;

        let Some((last, init)) = target.suffixes.split_last() else {
            return Ok(Place::Var(root.node.clone()));
        };
        let mut base = self.emitter.read_var(&root.node);
        for suffix in init {
            base = self.apply_suffix(base, suffix)?;
        }
        match last {
            Suffix::Item(index) => {
                let index = self.lower_expr(index)?;
                Ok(Place::Item { base, index })
            }
            Suffix::Attr(name) => Ok(Place::Attr {
                base,
                name: name.clone(),
            }),
            Suffix::Call(_) => Err(invalid()),
        }
    }

    // ------------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------------

    fn lower_for(&mut self, f: &ForStmt) -> Result<E::Fragment, SemanticError> {
        self.scopes.enter_loop_scope();
        let iterable = self.lower_expr(&f.iterable)?;
        self.scopes.bind(&f.var.node, true, f.var.span)?;
        let body = self.lower_frame_body(&f.body)?;
        self.scopes.leave_loop_scope();
        Ok(self.emitter.for_index(&f.var.node, iterable, body))
    }

    fn lower_while(&mut self, w: &WhileStmt) -> Result<E::Fragment, SemanticError> {
        self.scopes.enter_loop_scope();
        let condition = self.lower_expr(&w.condition)?;
        let body = self.lower_frame_body(&w.body)?;
        self.scopes.leave_loop_scope();
        Ok(self.emitter.while_loop(condition, body))
    }

    /// `if`/`elif`/`else`, lowered in source order and then folded into nested two-way conditionals.
    fn lower_if(&mut self, i: &IfStmt) -> Result<E::Fragment, SemanticError> {
        let mut branches = Vec::with_capacity(i.branches.len());
        for branch in &i.branches {
            let condition = self.lower_expr(&branch.condition)?;
            let body = self.lower_branch_body(&branch.body)?;
            branches.push((condition, body));
        }
        let mut otherwise = match &i.else_body {
            Some(body) => Some(self.lower_branch_body(body)?),
            None => None,
        };

        if branches.is_empty() {
            // A bare `else` runs unconditionally.
            let always = self.emitter.boolean(true);
            return Ok(self.emitter.if_else(always, otherwise.unwrap_or_default(), None));
        }
        let (first_condition, first_body) = branches.remove(0);
        while let Some((condition, body)) = branches.pop() {
            let nested = self.emitter.if_else(condition, body, otherwise.take());
            otherwise = Some(vec![nested]);
        }
        Ok(self.emitter.if_else(first_condition, first_body, otherwise))
    }

    // ------------------------------------------------------------------------
    // Module boundary
    // ------------------------------------------------------------------------

    fn lower_import(&mut self, import: &ImportStmt, stmt_span: Span) -> Result<Vec<E::Fragment>, SemanticError> {
        let mut out = Vec::with_capacity(import.items.len());
        for item in &import.items {
            let span = if item.span.is_empty() { stmt_span } else { item.span };
            self.require_module_level("import", span)?;
            let malformed = item.path.is_empty() || item.path.iter().any(String::is_empty);
            let local = match item.local_name() {
                Some(name) if !name.is_empty() && !malformed => name,
                _ => {
                    return Err(SemanticError::EmptyImport {
                        span: source_span(span),
                    });
                }
            };
            let path = item.dotted_path();
            let rebinds = self.scopes.binds_locally(local);
            self.scopes.import_binding(&path, local, span)?;
            out.push(self.emitter.import(local, &path, rebinds));
        }
        Ok(out)
    }

    fn lower_export(&mut self, export: &ExportStmt) -> Result<(), SemanticError> {
        let name = &export.name;
        self.require_module_level("export", name.span)?;
        self.scopes.export_binding(&name.node, export.foreign_name(), name.span)
    }

    /// Imports and exports must sit directly in the unit's statement list.
    fn require_module_level(&self, construct: &str, span: Span) -> Result<(), SemanticError> {
        if self.branch_depth > 0 {
            return Err(SemanticError::NotTopLevel {
                construct: construct.to_string(),
                span: source_span(span),
            });
        }
        // Frame depth is checked by the scope stack itself.
        Ok(())
    }

    fn class_not_implemented(class: &ClassDecl) -> SemanticError {
        SemanticError::NotImplemented {
            construct: format!("class `{}`", class.name.node),
            span: source_span(class.name.span),
        }
    }
}
