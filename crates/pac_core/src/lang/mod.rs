//! Pa language vocabulary registries.
//!
//! Callers work with **stable IDs** (e.g. [`operators::OperatorId`]) and look up spellings/metadata via registry
//! tables instead of matching strings throughout the compiler.
//!
//! ## Examples
//! ```rust
//! use pac_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("mod"), Some(OperatorId::Mod));
//! assert_eq!(operators::as_str(OperatorId::Mod), "mod");
//! ```

pub mod intrinsics;
pub mod operators;
pub mod rust_keywords;
