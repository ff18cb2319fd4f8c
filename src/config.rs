//! Compiler configuration.
//!
//! ## Examples
//!
//! ```rust
//! use pac::config::{BackendKind, CompileOptions};
//!
//! let options = CompileOptions::default()
//!     .with_backend(BackendKind::Cpp)
//!     .library(true)
//!     .with_intrinsic("open");
//! assert!(options.intrinsics.iter().any(|n| n == "print"));
//! assert!(options.intrinsics.iter().any(|n| n == "open"));
//! ```

use std::fmt;
use std::str::FromStr;

use pac_core::lang::intrinsics;

/// Target the driver emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Rust source against `pa_runtime`.
    #[default]
    Rust,
    /// C++ source against `palang.h`.
    Cpp,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Rust => "rust",
            BackendKind::Cpp => "cpp",
        }
    }

    /// Conventional file extension for emitted sources.
    pub fn extension(self) -> &'static str {
        match self {
            BackendKind::Rust => "rs",
            BackendKind::Cpp => "cc",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rust" | "rs" => Ok(BackendKind::Rust),
            "cpp" | "c++" | "cc" => Ok(BackendKind::Cpp),
            other => Err(format!("unknown backend `{other}` (expected `rust` or `cpp`)")),
        }
    }
}

/// Options for compiling one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Names bound as external read-only in the global frame.
    pub intrinsics: Vec<String>,
    /// Libraries get no entry point.
    pub is_library: bool,
    pub backend: BackendKind,
    /// Module name recorded in the output banner.
    pub module_name: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            intrinsics: intrinsics::default_names().map(str::to_string).collect(),
            is_library: false,
            backend: BackendKind::default(),
            module_name: None,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn library(mut self, is_library: bool) -> Self {
        self.is_library = is_library;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Add an intrinsic; duplicates are ignored.
    pub fn with_intrinsic(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.intrinsics.contains(&name) {
            self.intrinsics.push(name);
        }
        self
    }

    /// Replace the intrinsic set.
    pub fn with_intrinsics<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.intrinsics = Vec::new();
        for name in names {
            self = self.with_intrinsic(name);
        }
        self
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }
}
