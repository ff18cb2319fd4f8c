//! Default intrinsic vocabulary.
//!
//! Intrinsics are names pre-bound in the outermost scope of every compilation unit without being declared by the unit
//! itself. The driver may replace this set; the semantic core never hard-codes any of these names.

/// Metadata for a default intrinsic.
#[derive(Debug, Clone, Copy)]
pub struct IntrinsicInfo {
    pub name: &'static str,
    pub summary: &'static str,
}

/// Registry of the intrinsics seeded when the driver does not configure its own set.
pub const DEFAULT_INTRINSICS: &[IntrinsicInfo] = &[
    IntrinsicInfo {
        name: "nil",
        summary: "The nil value as a named binding.",
    },
    IntrinsicInfo {
        name: "range",
        summary: "Inclusive integer sequence constructor: range(start, end, step=1).",
    },
    IntrinsicInfo {
        name: "print",
        summary: "Write every positional argument to standard output.",
    },
    IntrinsicInfo {
        name: "input",
        summary: "Read an integer from standard input.",
    },
    IntrinsicInfo {
        name: "len",
        summary: "Length of a list or string.",
    },
];

/// Names of the default intrinsics, in registry order.
pub fn default_names() -> impl Iterator<Item = &'static str> {
    DEFAULT_INTRINSICS.iter().map(|i| i.name)
}

/// Look up the metadata of a default intrinsic.
pub fn info(name: &str) -> Option<&'static IntrinsicInfo> {
    DEFAULT_INTRINSICS.iter().find(|i| i.name == name)
}
