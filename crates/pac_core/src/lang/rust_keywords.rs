//! Rust keyword vocabulary (for codegen identifier escaping).

/// Reserved + strict keywords in Rust (2024 edition).
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen", "self", "Self",
];

/// Keywords that cannot be written as raw identifiers (`r#self` is rejected by rustc).
pub const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Check whether an identifier is a Rust keyword.
pub fn is_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name) || NON_RAW_KEYWORDS.contains(&name)
}

/// Check whether a keyword must be renamed instead of written as `r#name`.
pub fn needs_rename(name: &str) -> bool {
    NON_RAW_KEYWORDS.contains(&name)
}
