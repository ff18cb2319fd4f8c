//! Scope frame stack for Pa.
//!
//! One frame per lexical nesting level. Frames come in two kinds with different capture disciplines:
//!
//! - **Closure** frames (function bodies, `var` blocks, the global frame) see every inherited binding as read-only.
//!   Generated closures copy what they use at definition time, so a write to an outer variable could never be
//!   observed outside and is rejected instead.
//! - **Loop** frames (`for`/`while` bodies) are transparent: inherited bindings keep their mutability, so code after
//!   the loop observes mutations made inside it.
//!
//! A frame only stores its *own* bindings. Lookups walk outward and downgrade what they find when they cross a
//! closure boundary. Because lowering is a single depth-first pass, outer frames cannot change while an inner frame
//! is open, which makes the walk equivalent to a frozen snapshot taken when the closure frame was entered.
//!
//! ## Notes
//!
//! - Names first created in a frame are *pending* until the lowering pass flushes them into storage declarations.
//! - Reads that cross closure frames are recorded as captures of each crossed frame; backends value-capture exactly
//!   those names.

use std::collections::{BTreeMap, HashMap};

use pac_syntax::ast::Span;

use super::errors::{SemanticError, source_span};
use super::links::{LinkTable, Linkage};

/// Mutability state of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarState {
    /// A local the unit may assign.
    Writable,
    /// A local that may only be read here (captured, loop variable).
    ReadOnly,
    /// Provided from outside the unit: intrinsics and imports.
    ExternalReadOnly,
    /// An exported slot: declared by the module boundary, assignable by the unit.
    ExternalWritable,
}

impl VarState {
    /// Whether an assignment to a binding in this state is accepted.
    pub fn is_writable(self) -> bool {
        matches!(self, VarState::Writable | VarState::ExternalWritable)
    }

    pub fn is_external(self) -> bool {
        matches!(self, VarState::ExternalReadOnly | VarState::ExternalWritable)
    }

    /// State observed from inside a closure frame.
    pub fn captured(self) -> Self {
        match self {
            VarState::Writable => VarState::ReadOnly,
            VarState::ExternalWritable => VarState::ExternalReadOnly,
            other => other,
        }
    }
}

/// Kind of a scope frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Closure,
    LoopBlock,
}

/// Result of resolving a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// State as observed from the current frame.
    pub state: VarState,
    /// Index of the frame that owns the binding (0 = global).
    pub frame: usize,
    /// Whether this resolution created the binding.
    pub created: bool,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    bindings: HashMap<String, VarState>,
    pending: Vec<String>,
    captures: Vec<String>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            bindings: HashMap::new(),
            pending: Vec::new(),
            captures: Vec::new(),
        }
    }
}

/// The scope frame stack of one compilation unit.
///
/// Created once per unit and never shared: independent units use independent stacks.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    links: LinkTable,
}

impl ScopeStack {
    /// Create a stack whose global frame holds the given intrinsics as external read-only bindings.
    pub fn new<I, S>(intrinsics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut global = Frame::new(FrameKind::Closure);
        for name in intrinsics {
            global.bindings.insert(name.into(), VarState::ExternalReadOnly);
        }
        Self {
            frames: vec![global],
            links: LinkTable::new(),
        }
    }

    /// Number of open frames, the global frame included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether the current frame is the unit's top-level frame.
    pub fn is_top_level(&self) -> bool {
        self.frames.len() == 1
    }

    /// Whether statements here run as part of the unit's initialization: no closure frame is open above the global
    /// frame, only loops.
    pub fn in_unit_body(&self) -> bool {
        self.frames.iter().skip(1).all(|f| f.kind == FrameKind::LoopBlock)
    }

    pub fn current_kind(&self) -> FrameKind {
        self.current().kind
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    pub fn into_links(self) -> LinkTable {
        self.links
    }

    /// Whether the current frame itself binds `name`.
    pub fn binds_locally(&self, name: &str) -> bool {
        self.current().bindings.contains_key(name)
    }

    fn current(&self) -> &Frame {
        // The global frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    // ------------------------------------------------------------------------
    // Frame lifecycle
    // ------------------------------------------------------------------------

    /// Enter a function body or `var` block.
    pub fn enter_closure_scope(&mut self) {
        self.frames.push(Frame::new(FrameKind::Closure));
        tracing::debug!(depth = self.frames.len(), "enter closure scope");
    }

    /// Leave a function body or `var` block, returning the names it captured in first-use order.
    pub fn leave_closure_scope(&mut self) -> Vec<String> {
        self.pop_frame(FrameKind::Closure)
    }

    /// Enter a `for`/`while` body.
    pub fn enter_loop_scope(&mut self) {
        self.frames.push(Frame::new(FrameKind::LoopBlock));
        tracing::debug!(depth = self.frames.len(), "enter loop scope");
    }

    pub fn leave_loop_scope(&mut self) {
        let captures = self.pop_frame(FrameKind::LoopBlock);
        debug_assert!(captures.is_empty(), "loop frames never capture");
    }

    fn pop_frame(&mut self, expected: FrameKind) -> Vec<String> {
        debug_assert!(self.frames.len() > 1, "the global frame is never popped");
        if self.frames.len() == 1 {
            return Vec::new();
        }
        let frame = self.frames.pop().map(|f| {
            debug_assert_eq!(f.kind, expected, "unbalanced scope enter/leave");
            debug_assert!(f.pending.is_empty(), "pending declarations {:?} were not flushed", f.pending);
            f
        });
        tracing::debug!(depth = self.frames.len(), kind = ?expected, "leave scope");
        frame.map(|f| f.captures).unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------------

    /// Bind `name` in the current frame and mark it pending for a storage declaration.
    ///
    /// Rebinding an own writable name is legal and does not declare it again; rebinding an own read-only or
    /// external read-only name fails.
    pub fn define(&mut self, name: &str, read_only: bool, span: Span) -> Result<VarState, SemanticError> {
        let fresh = self.bind(name, read_only, span)?;
        if fresh {
            self.current_mut().pending.push(name.to_string());
        }
        Ok(self.current().bindings[name])
    }

    /// Bind `name` in the current frame without marking it pending.
    ///
    /// Used for names whose storage is produced by the construct itself (parameters, loop variables).
    /// Returns whether the binding is new to this frame.
    pub fn bind(&mut self, name: &str, read_only: bool, span: Span) -> Result<bool, SemanticError> {
        let state = if read_only {
            VarState::ReadOnly
        } else {
            VarState::Writable
        };
        match self.current().bindings.get(name).copied() {
            Some(existing) if existing.is_writable() && !read_only => {
                tracing::trace!(name, "rebind");
                Ok(false)
            }
            Some(existing) if !existing.is_writable() => Err(SemanticError::ReadOnly {
                name: name.to_string(),
                span: source_span(span),
            }),
            Some(_) | None => {
                let fresh = !self.current().bindings.contains_key(name);
                self.current_mut().bindings.insert(name.to_string(), state);
                tracing::trace!(name, ?state, depth = self.frames.len(), "define");
                Ok(fresh)
            }
        }
    }

    /// Find the nearest binding of `name` and the closure frames crossed to reach it.
    fn lookup(&self, name: &str) -> Option<(usize, VarState, Vec<usize>)> {
        let mut crossed = Vec::new();
        for (index, frame) in self.frames.iter().enumerate().rev() {
            if let Some(state) = frame.bindings.get(name) {
                let observed = if crossed.is_empty() { *state } else { state.captured() };
                return Some((index, observed, crossed));
            }
            if frame.kind == FrameKind::Closure {
                crossed.push(index);
            }
        }
        None
    }

    /// Resolve a read of `name`.
    pub fn resolve_read(&mut self, name: &str, span: Span) -> Result<Resolved, SemanticError> {
        let Some((frame, state, crossed)) = self.lookup(name) else {
            return Err(SemanticError::UndefinedVariable {
                name: name.to_string(),
                span: source_span(span),
            });
        };
        for index in crossed {
            let captures = &mut self.frames[index].captures;
            if !captures.iter().any(|c| c == name) {
                captures.push(name.to_string());
            }
        }
        tracing::trace!(name, ?state, frame, "resolve read");
        Ok(Resolved {
            state,
            frame,
            created: false,
        })
    }

    /// Resolve a write to `name`.
    ///
    /// The first assignment to an unbound name creates a writable binding in the current frame.
    pub fn resolve_write(&mut self, name: &str, span: Span) -> Result<Resolved, SemanticError> {
        match self.lookup(name) {
            Some((frame, state, _)) if state.is_writable() => {
                tracing::trace!(name, ?state, frame, "resolve write");
                Ok(Resolved {
                    state,
                    frame,
                    created: false,
                })
            }
            Some(_) => Err(SemanticError::ReadOnly {
                name: name.to_string(),
                span: source_span(span),
            }),
            None => {
                let state = self.define(name, false, span)?;
                Ok(Resolved {
                    state,
                    frame: self.frames.len() - 1,
                    created: true,
                })
            }
        }
    }

    /// Drain the current frame's pending declarations in definition order.
    pub fn flush_pending_declarations(&mut self) -> Vec<String> {
        std::mem::take(&mut self.current_mut().pending)
    }

    // ------------------------------------------------------------------------
    // Module boundary
    // ------------------------------------------------------------------------

    /// Register `import foreign as local`.
    pub fn import_binding(&mut self, foreign: &str, local: &str, span: Span) -> Result<(), SemanticError> {
        self.require_top_level("import", span)?;
        if self.current().bindings.get(local).is_some_and(|s| s.is_writable()) {
            return Err(SemanticError::ImportConflict {
                name: local.to_string(),
                span: source_span(span),
            });
        }
        self.current_mut()
            .bindings
            .insert(local.to_string(), VarState::ExternalReadOnly);
        self.links.push(foreign, local, Linkage::Import);
        tracing::debug!(foreign, local, "import");
        Ok(())
    }

    /// Register `export local as foreign`.
    ///
    /// An export names a fresh module-level slot, so the local name must not be bound yet.
    pub fn export_binding(&mut self, local: &str, foreign: &str, span: Span) -> Result<(), SemanticError> {
        self.require_top_level("export", span)?;
        if self.lookup(local).is_some() {
            return Err(SemanticError::ExportRedefinition {
                name: local.to_string(),
                span: source_span(span),
            });
        }
        self.current_mut()
            .bindings
            .insert(local.to_string(), VarState::ExternalWritable);
        self.links.push(foreign, local, Linkage::Export);
        tracing::debug!(local, foreign, "export");
        Ok(())
    }

    fn require_top_level(&self, construct: &str, span: Span) -> Result<(), SemanticError> {
        if self.is_top_level() {
            Ok(())
        } else {
            Err(SemanticError::NotTopLevel {
                construct: construct.to_string(),
                span: source_span(span),
            })
        }
    }

    // ------------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------------

    /// Check that `break`/`continue` reaches a loop frame without crossing a closure frame.
    pub fn check_loop_control(&self, keyword: &str, span: Span) -> Result<(), SemanticError> {
        for frame in self.frames.iter().rev() {
            match frame.kind {
                FrameKind::LoopBlock => return Ok(()),
                FrameKind::Closure => break,
            }
        }
        Err(SemanticError::LoopControlOutsideLoop {
            keyword: keyword.to_string(),
            span: source_span(span),
        })
    }

    /// Every name visible from the current frame with its observed state.
    ///
    /// Does not record captures.
    pub fn snapshot(&self) -> BTreeMap<String, VarState> {
        let mut names: Vec<&String> = self.frames.iter().flat_map(|f| f.bindings.keys()).collect();
        names.sort();
        names.dedup();
        names
            .into_iter()
            .filter_map(|name| self.lookup(name).map(|(_, state, _)| (name.clone(), state)))
            .collect()
    }
}
