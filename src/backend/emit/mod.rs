//! Target emission contract.
//!
//! Lowering walks the syntax tree once, resolves every name against the scope stack, and asks an [`Emitter`] to build
//! target fragments bottom-up. The emitter never sees scoping rules: by the time a fragment is requested, the name has
//! been validated and its storage declaration has been (or will be) requested through [`Emitter::declare`].
//!
//! Two emitters ship with the compiler:
//!
//! - [`RustEmitter`]: builds a `syn` syntax tree and pretty-prints it; the generated module links against the
//!   `pa_runtime` crate.
//! - [`CppEmitter`]: builds C++ source text against the `palang.h` runtime header.
//!
//! ## Notes
//! - Fragments are opaque to lowering. A fragment may be an expression or a statement list depending on the method
//!   that produced it; lowering only combines them in the positions this trait documents.
//! - Every method except [`Emitter::finish_module`] is infallible. Emitters that can reject input (for example an
//!   identifier the target cannot spell) record the first problem and report it from `finish_module`.

mod cpp;
mod errors;
mod rust;

pub use cpp::CppEmitter;
pub use errors::EmitError;
pub use rust::RustEmitter;

use pac_core::lang::operators::OperatorId;

use crate::semantics::LinkTable;

/// A parameter of a function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamParts<F> {
    pub name: String,
    /// Default value, evaluated only when the argument is missing.
    pub default: Option<F>,
}

/// Everything needed to build a function value.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParts<F> {
    pub params: Vec<ParamParts<F>>,
    pub body: Vec<F>,
    /// Outer names the body reads, in first-use order. Never contains `self_name`.
    pub captures: Vec<String>,
    /// Set when the function is stored into a plain variable and refers to that variable from its own body.
    pub self_name: Option<String>,
}

/// Body of a `var` block and the outer names it reads.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockParts<F> {
    pub body: Vec<F>,
    pub captures: Vec<String>,
}

/// Store location of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Place<F> {
    Var(String),
    Item { base: F, index: F },
    Attr { base: F, name: String },
}

/// Module-level information handed to [`Emitter::finish_module`].
#[derive(Debug, Clone)]
pub struct ModuleParts<'a, F> {
    pub intrinsics: &'a [String],
    pub links: &'a LinkTable,
    pub body: Vec<F>,
    /// Libraries get no entry point.
    pub is_library: bool,
    pub module_name: Option<&'a str>,
}

/// Builds target code fragments for one compilation unit.
pub trait Emitter {
    type Fragment;

    // --- literals ---------------------------------------------------------------

    fn nil(&mut self) -> Self::Fragment;
    fn boolean(&mut self, value: bool) -> Self::Fragment;
    fn integer(&mut self, value: i64) -> Self::Fragment;
    fn real(&mut self, value: f64) -> Self::Fragment;
    fn string(&mut self, value: &str) -> Self::Fragment;
    fn list(&mut self, items: Vec<Self::Fragment>) -> Self::Fragment;
    fn dict(&mut self, entries: Vec<(Self::Fragment, Self::Fragment)>) -> Self::Fragment;
    fn function(&mut self, parts: FunctionParts<Self::Fragment>) -> Self::Fragment;
    /// A block evaluated in place, yielding what its body returns (nil otherwise).
    fn value_block(&mut self, parts: BlockParts<Self::Fragment>) -> Self::Fragment;

    // --- expressions ------------------------------------------------------------

    /// Binary operator application. Both operands are always evaluated.
    fn binary(&mut self, op: OperatorId, lhs: Self::Fragment, rhs: Self::Fragment) -> Self::Fragment;
    fn not(&mut self, operand: Self::Fragment) -> Self::Fragment;
    fn read_var(&mut self, name: &str) -> Self::Fragment;
    fn item(&mut self, base: Self::Fragment, index: Self::Fragment) -> Self::Fragment;
    fn attr(&mut self, base: Self::Fragment, name: &str) -> Self::Fragment;
    fn call(
        &mut self,
        callee: Self::Fragment,
        positional: Vec<Self::Fragment>,
        keywords: Vec<(String, Self::Fragment)>,
    ) -> Self::Fragment;

    // --- statements -------------------------------------------------------------

    /// Storage for names first bound in the enclosing frame, initialized to nil.
    fn declare(&mut self, names: &[String]) -> Self::Fragment;
    fn assign(&mut self, place: Place<Self::Fragment>, value: Self::Fragment) -> Self::Fragment;
    fn expr_stmt(&mut self, value: Self::Fragment) -> Self::Fragment;
    fn if_else(
        &mut self,
        condition: Self::Fragment,
        then_body: Vec<Self::Fragment>,
        else_body: Option<Vec<Self::Fragment>>,
    ) -> Self::Fragment;
    /// Index loop: evaluate `iterable` once, take its length once, bind `var` to each item.
    fn for_index(&mut self, var: &str, iterable: Self::Fragment, body: Vec<Self::Fragment>) -> Self::Fragment;
    fn while_loop(&mut self, condition: Self::Fragment, body: Vec<Self::Fragment>) -> Self::Fragment;
    fn break_stmt(&mut self) -> Self::Fragment;
    fn continue_stmt(&mut self) -> Self::Fragment;
    fn return_stmt(&mut self, value: Self::Fragment) -> Self::Fragment;
    /// `return` outside any function: evaluate `value`, then skip the rest of the top-level statements. The
    /// initializer still produces the export table.
    fn unit_return(&mut self, value: Self::Fragment) -> Self::Fragment;
    /// Bind `local` to the module found at the dotted `path`. `rebinds` is set when the frame already binds `local`.
    fn import(&mut self, local: &str, path: &str, rebinds: bool) -> Self::Fragment;

    // --- module -----------------------------------------------------------------

    /// Wrap the lowered top-level statements into a complete module.
    fn finish_module(&mut self, parts: ModuleParts<'_, Self::Fragment>) -> Result<String, EmitError>;
}

/// Runtime function naming an operator, shared by both backends (`add`, `sub`, ...).
pub(crate) fn operator_symbol(op: OperatorId) -> &'static str {
    match op {
        OperatorId::Add => "add",
        OperatorId::Sub => "sub",
        OperatorId::Mul => "mul",
        OperatorId::Div => "div",
        OperatorId::Mod => "rem",
        OperatorId::Pow => "pow",
        OperatorId::Eq => "eq",
        OperatorId::NotEq => "ne",
        OperatorId::Gt => "gt",
        OperatorId::GtEq => "ge",
        OperatorId::Lt => "lt",
        OperatorId::LtEq => "le",
        OperatorId::Right => "right",
        OperatorId::Left => "left",
        OperatorId::And => "and",
        OperatorId::Or => "or",
        OperatorId::Not => "not",
    }
}
