//! Provide the canonical language vocabulary for the Pa compiler.
//!
//! This crate is intentionally small and dependency-free. It holds the tables that both the semantic core and every
//! code-generation backend must agree on: operator spellings, the default intrinsic set, and the target keyword lists
//! used when escaping identifiers.
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global state, and no compiler-specific types.

pub mod lang;
