//! Operator vocabulary.
//!
//! This module defines the canonical operator set (symbol operators like `+` and word operators like `and`) along
//! with the metadata the compiler and tooling need: category, fixity and the precedence level the front-end used
//! when it flattened an expression.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Precedence is informational. Operator chains reach the compiler already precedence-resolved, and lowering folds
//!   each chain strictly left-to-right.
//! - `not` is the only prefix operator.
//!
//! ## Examples
//! ```rust
//! use pac_core::lang::operators::{self, Fixity, OperatorId};
//!
//! assert_eq!(operators::from_str("->"), Some(OperatorId::Right));
//! assert_eq!(operators::info_for(OperatorId::Not).fixity, Fixity::Prefix);
//! assert_eq!(operators::binary_from_str("not"), None);
//! ```

/// Define whether an operator is infix (binary) or prefix (unary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
}

/// Broad operator family, used by diagnostics and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    Arithmetic,
    Comparison,
    Boolean,
    /// `->` and `<-`: value flow operators whose meaning is decided by the runtime.
    Directional,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Comparison
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,

    // Directional
    Right,
    Left,

    // Boolean
    And,
    Or,
    Not,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spellings: &'static [&'static str],
    pub precedence: u8,
    pub fixity: Fixity,
    pub category: OperatorCategory,
    pub is_keyword_spelling: bool,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Mul, &["*"], 70, Fixity::Infix, OperatorCategory::Arithmetic, false),
    op(OperatorId::Div, &["/"], 70, Fixity::Infix, OperatorCategory::Arithmetic, false),
    op(OperatorId::Mod, &["mod"], 70, Fixity::Infix, OperatorCategory::Arithmetic, true),
    op(OperatorId::Pow, &["^"], 70, Fixity::Infix, OperatorCategory::Arithmetic, false),
    op(OperatorId::Add, &["+"], 60, Fixity::Infix, OperatorCategory::Arithmetic, false),
    op(OperatorId::Sub, &["-"], 60, Fixity::Infix, OperatorCategory::Arithmetic, false),
    // Comparison
    op(OperatorId::Eq, &["=="], 50, Fixity::Infix, OperatorCategory::Comparison, false),
    op(OperatorId::NotEq, &["!="], 50, Fixity::Infix, OperatorCategory::Comparison, false),
    op(OperatorId::Gt, &[">"], 50, Fixity::Infix, OperatorCategory::Comparison, false),
    op(OperatorId::GtEq, &[">="], 50, Fixity::Infix, OperatorCategory::Comparison, false),
    op(OperatorId::Lt, &["<"], 50, Fixity::Infix, OperatorCategory::Comparison, false),
    op(OperatorId::LtEq, &["<="], 50, Fixity::Infix, OperatorCategory::Comparison, false),
    // Directional
    op(OperatorId::Right, &["->"], 50, Fixity::Infix, OperatorCategory::Directional, false),
    op(OperatorId::Left, &["<-"], 50, Fixity::Infix, OperatorCategory::Directional, false),
    // Word operators (keyword spellings)
    op(OperatorId::Not, &["not"], 40, Fixity::Prefix, OperatorCategory::Boolean, true),
    op(OperatorId::And, &["and"], 30, Fixity::Infix, OperatorCategory::Boolean, true),
    op(OperatorId::Or, &["or"], 20, Fixity::Infix, OperatorCategory::Boolean, true),
];

/// Return the full metadata entry for an operator.
///
/// ## Returns
/// - The associated [`OperatorInfo`] from [`OPERATORS`].
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    // Every OperatorId has exactly one row; the registry guardrail test enforces it.
    match OPERATORS.iter().find(|o| o.id == id) {
        Some(info) => info,
        None => unreachable!("operator registry is missing {id:?}"),
    }
}

/// Return the canonical spelling of an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spellings[0]
}

/// Resolve an operator spelling to its identifier, regardless of fixity.
///
/// ## Notes
/// - Matching is **case-sensitive**.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| o.spellings.contains(&spelling))
        .map(|o| o.id)
}

/// Resolve a spelling that must denote a binary (infix) operator.
pub fn binary_from_str(spelling: &str) -> Option<OperatorId> {
    from_str(spelling).filter(|id| info_for(*id).fixity == Fixity::Infix)
}

/// Resolve a spelling that must denote a prefix operator.
pub fn unary_from_str(spelling: &str) -> Option<OperatorId> {
    from_str(spelling).filter(|id| info_for(*id).fixity == Fixity::Prefix)
}

// --- helpers -----------------------------------------------------------------

const fn op(
    id: OperatorId,
    spellings: &'static [&'static str],
    precedence: u8,
    fixity: Fixity,
    category: OperatorCategory,
    is_keyword_spelling: bool,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spellings,
        precedence,
        fixity,
        category,
        is_keyword_spelling,
    }
}
