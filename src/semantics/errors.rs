//! Semantic errors raised while resolving scopes and lowering a compilation unit.
//!
//! Every error is fatal to the unit: lowering stops at the first one and no partial output is produced.
//! Each variant names the offending identifier (or construct) and points at it with a labelled span, so the CLI can
//! render it against the original Pa source with `miette`.

use miette::{Diagnostic, SourceSpan};
use pac_syntax::ast::Span;
use thiserror::Error;

/// Convert a tree span into a `miette` span.
pub fn source_span(span: Span) -> SourceSpan {
    (span.start, span.len()).into()
}

/// A compile-time semantic error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SemanticError {
    #[error("undefined variable `{name}`")]
    #[diagnostic(
        code(pac::undefined_variable),
        help("assign the variable before reading it, or configure it as an intrinsic")
    )]
    UndefinedVariable {
        name: String,
        #[label("not bound in this scope")]
        span: SourceSpan,
    },

    #[error("variable `{name}` is read-only in the scope")]
    #[diagnostic(
        code(pac::read_only),
        help("captured variables, loop variables, intrinsics and imports cannot be reassigned")
    )]
    ReadOnly {
        name: String,
        #[label("cannot be written here")]
        span: SourceSpan,
    },

    #[error("cannot export `{name}`: the name is already bound")]
    #[diagnostic(
        code(pac::export_redefinition),
        help("an export declares a fresh module-level slot; export the name before assigning it")
    )]
    ExportRedefinition {
        name: String,
        #[label("already bound")]
        span: SourceSpan,
    },

    #[error("duplicate parameter `{name}`")]
    #[diagnostic(code(pac::duplicate_parameter), help("every parameter of a function needs its own name"))]
    DuplicateParameter {
        name: String,
        #[label("already a parameter of this function")]
        span: SourceSpan,
    },

    #[error("cannot import as `{name}`: a writable local with that name already exists")]
    #[diagnostic(code(pac::import_conflict), help("import under a different alias with `as`"))]
    ImportConflict {
        name: String,
        #[label("conflicting import")]
        span: SourceSpan,
    },

    #[error("import path is empty")]
    #[diagnostic(code(pac::invalid_import))]
    EmptyImport {
        #[label("nothing to import")]
        span: SourceSpan,
    },

    #[error("`{keyword}` outside of a loop")]
    #[diagnostic(
        code(pac::loop_control_outside_loop),
        help("loops do not extend into function bodies or `var` blocks")
    )]
    LoopControlOutsideLoop {
        keyword: String,
        #[label("no enclosing `for` or `while` in this function")]
        span: SourceSpan,
    },

    #[error("unsupported unary operator `{op}`")]
    #[diagnostic(code(pac::unsupported_unary), help("`not` is the only prefix operator"))]
    UnsupportedUnary {
        op: String,
        #[label("unsupported")]
        span: SourceSpan,
    },

    #[error("unknown binary operator `{op}`")]
    #[diagnostic(code(pac::unknown_operator))]
    UnknownOperator {
        op: String,
        #[label("not an operator")]
        span: SourceSpan,
    },

    #[error("`{construct}` is only allowed at the top level")]
    #[diagnostic(code(pac::not_top_level))]
    NotTopLevel {
        construct: String,
        #[label("nested here")]
        span: SourceSpan,
    },

    #[error("cannot assign to the result of calling `{name}`")]
    #[diagnostic(code(pac::invalid_assign_target))]
    InvalidAssignTarget {
        name: String,
        #[label("call in assignment target")]
        span: SourceSpan,
    },

    #[error("{construct} is not implemented")]
    #[diagnostic(code(pac::not_implemented))]
    NotImplemented {
        construct: String,
        #[label("not supported by this compiler")]
        span: SourceSpan,
    },
}

impl SemanticError {
    /// The identifier the error is about, when there is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            SemanticError::UndefinedVariable { name, .. }
            | SemanticError::ReadOnly { name, .. }
            | SemanticError::ExportRedefinition { name, .. }
            | SemanticError::ImportConflict { name, .. }
            | SemanticError::DuplicateParameter { name, .. }
            | SemanticError::InvalidAssignTarget { name, .. } => Some(name),
            SemanticError::UnsupportedUnary { op, .. } | SemanticError::UnknownOperator { op, .. } => Some(op),
            _ => None,
        }
    }

    /// Source span the error points at.
    pub fn span(&self) -> SourceSpan {
        match self {
            SemanticError::UndefinedVariable { span, .. }
            | SemanticError::ReadOnly { span, .. }
            | SemanticError::ExportRedefinition { span, .. }
            | SemanticError::ImportConflict { span, .. }
            | SemanticError::DuplicateParameter { span, .. }
            | SemanticError::EmptyImport { span }
            | SemanticError::LoopControlOutsideLoop { span, .. }
            | SemanticError::UnsupportedUnary { span, .. }
            | SemanticError::UnknownOperator { span, .. }
            | SemanticError::NotTopLevel { span, .. }
            | SemanticError::InvalidAssignTarget { span, .. }
            | SemanticError::NotImplemented { span, .. } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_identifier() {
        let err = SemanticError::ReadOnly {
            name: "x".into(),
            span: source_span(Span::new(4, 5)),
        };
        assert_eq!(err.to_string(), "variable `x` is read-only in the scope");
        assert_eq!(err.name(), Some("x"));
        assert_eq!(err.span(), SourceSpan::from((4, 1)));
    }

    #[test]
    fn diagnostic_codes_are_stable() {
        let err = SemanticError::LoopControlOutsideLoop {
            keyword: "break".into(),
            span: source_span(Span::default()),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("pac::loop_control_outside_loop"));
    }
}
