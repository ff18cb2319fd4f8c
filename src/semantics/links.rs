//! Import/export table of a compilation unit.
//!
//! The table is filled only while top-level statements are visited and becomes the module boundary: imports are
//! loaded in place, exports are forward-declared and returned by the module initializer under their foreign names.

/// Direction of a module-boundary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
    Import,
    Export,
}

/// One `(foreign-name, local-name, linkage)` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Dotted package path for imports, external alias for exports.
    pub foreign: String,
    /// Binding name inside this unit.
    pub local: String,
    pub linkage: Linkage,
}

/// Ordered import/export table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTable {
    entries: Vec<LinkEntry>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, foreign: impl Into<String>, local: impl Into<String>, linkage: Linkage) {
        self.entries.push(LinkEntry {
            foreign: foreign.into(),
            local: local.into(),
            linkage,
        });
    }

    pub fn entries(&self) -> &[LinkEntry] {
        &self.entries
    }

    pub fn imports(&self) -> impl Iterator<Item = &LinkEntry> {
        self.entries.iter().filter(|e| e.linkage == Linkage::Import)
    }

    pub fn exports(&self) -> impl Iterator<Item = &LinkEntry> {
        self.entries.iter().filter(|e| e.linkage == Linkage::Export)
    }

    /// Look up an export by its foreign name.
    pub fn export(&self, foreign: &str) -> Option<&LinkEntry> {
        self.exports().find(|e| e.foreign == foreign)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
