//! Semantic core: lexical scopes, variable mutability, and the module boundary.
//!
//! ## Modules
//!
//! - `scope` - Scope frame stack (`ScopeStack`) with closure/loop capture disciplines
//! - `links` - Import/export table (`LinkTable`)
//! - `errors` - `SemanticError`, the fatal compile-time error taxonomy

pub mod errors;
pub mod links;
pub mod scope;

pub use errors::SemanticError;
pub use links::{LinkEntry, LinkTable, Linkage};
pub use scope::{FrameKind, Resolved, ScopeStack, VarState};
