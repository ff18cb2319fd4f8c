//! Define error types for target emission.
//!
//! These errors represent *backend* failures, as opposed to semantic errors found while resolving names. A well-scoped
//! program only hits them when the target cannot express something the tree contains.

use thiserror::Error;

/// Error during target emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// Generated Rust tokens did not form a valid file.
    #[error("syn parse error: {0}")]
    SynParse(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}
