//! Abstract Syntax Tree definitions for Pa.
//!
//! One enum case per statement/expression kind, so an unrecognized node is a compile-time impossibility rather than
//! a runtime error.
//!
//! ## Notes
//! - Operator chains arrive flattened and already precedence-resolved: `a + b * c` is delivered as the chain
//!   `a + (b * c)` where the parenthesized part is a nested [`Expr`]. Operator tokens are kept as spellings and
//!   resolved by the compiler against the `pac_core` operator registry.
//! - `x = e;` is the front-end's shorthand for a value block whose single statement is `return e`.
//! - The `Statement`/`Expr` constructors at the bottom of this file exist for tools and tests that synthesize trees;
//!   statement constructors wrap their result in a default [`Span`].

use serde::{Deserialize, Serialize};

/// Source location span (byte offsets into the original Pa source)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    #[serde(default)]
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Wrap a node that has no recorded position.
    pub fn unspanned(node: T) -> Self {
        Self {
            node,
            span: Span::default(),
        }
    }
}

/// Identifier as written in the source (alphabetic only in Pa).
pub type Ident = String;

/// A statement list with positions.
pub type Block = Vec<Spanned<Statement>>;

/// A compilation unit: top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Block,
}

impl Program {
    pub fn new(statements: Block) -> Self {
        Self { statements }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `target = <block>` or `target(params) { body }`
    Assign(AssignStmt),
    /// An expression evaluated for its effect.
    Expr(Expr),
    For(ForStmt),
    While(WhileStmt),
    Break,
    Continue,
    If(IfStmt),
    /// `= expr` inside a block, `return expr` in the surface syntax.
    Return(Expr),
    Import(ImportStmt),
    Export(ExportStmt),
    /// Accepted by the grammar, never lowered.
    Class(ClassDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub target: Chain,
    pub value: AssignValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignValue {
    /// `x = <stmts>`: the block runs as a self-evaluating closure and its returned value is stored.
    Block(Block),
    /// `f(a, b = 1) { ... }`: a function literal stored in the target.
    Function { params: Vec<Param>, body: Block },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub var: Spanned<Ident>,
    pub iterable: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
}

/// `if c1 { } elif c2 { } else { }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub branches: Vec<IfBranch>,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Block,
}

/// `import a.b.c as x, d.e`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStmt {
    pub items: Vec<ImportItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportItem {
    pub path: Vec<Ident>,
    pub alias: Option<Ident>,
    #[serde(default)]
    pub span: Span,
}

impl ImportItem {
    /// Dotted package path as written (`a.b.c`).
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    /// Local name the import binds: the alias, or the last path segment.
    pub fn local_name(&self) -> Option<&str> {
        self.alias.as_deref().or_else(|| self.path.last().map(String::as_str))
    }
}

/// `export name as alias`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportStmt {
    pub name: Spanned<Ident>,
    pub alias: Option<Ident>,
}

impl ExportStmt {
    /// Name other modules see: the alias, or the local name.
    pub fn foreign_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name.node)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: Spanned<Ident>,
    #[serde(default)]
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub name: Ident,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassMemberKind {
    Constructor,
    Destructor,
    Method,
    Operator,
    Property,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    /// Prefix operator application; only `not` is meaningful.
    Unary { op: Spanned<String>, operand: Box<Expr> },
    /// `first op1 e1 op2 e2 ...`, folded left-to-right.
    Chain { first: Box<Expr>, rest: Vec<BinaryTail> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryTail {
    pub op: Spanned<String>,
    pub operand: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Nil,
    Integer(i64),
    Real(f64),
    String(String),
    List(Vec<Expr>),
    /// Inline dictionary: `{ key: value, ... }`
    Dict(Vec<(Expr, Expr)>),
    /// `func(params) { body }`
    Func(FuncLiteral),
    /// `var { body }`: a block evaluated in place, yielding what it returns.
    VarBlock(Block),
    /// An identifier followed by subscript/attribute/call suffixes.
    Rvalue(Chain),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncLiteral {
    pub params: Vec<Param>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Spanned<Ident>,
    pub default: Option<Expr>,
}

/// Identifier plus ordered suffixes; used both to read (rvalue) and to locate a store (lvalue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub root: Spanned<Ident>,
    #[serde(default)]
    pub suffixes: Vec<Suffix>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Suffix {
    /// `[expr]`
    Item(Expr),
    /// `.name`
    Attr(Ident),
    /// `(args)`
    Call(Vec<CallArg>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallArg {
    Positional(Expr),
    Keyword { name: Ident, value: Expr },
}

// ============================================================================
// Constructors
// ============================================================================

impl Chain {
    pub fn var(name: impl Into<Ident>) -> Self {
        Self {
            root: Spanned::unspanned(name.into()),
            suffixes: Vec::new(),
        }
    }

    pub fn with_suffix(mut self, suffix: Suffix) -> Self {
        self.suffixes.push(suffix);
        self
    }

    pub fn item(self, index: Expr) -> Self {
        self.with_suffix(Suffix::Item(index))
    }

    pub fn attr(self, name: impl Into<Ident>) -> Self {
        self.with_suffix(Suffix::Attr(name.into()))
    }

    pub fn call(self, args: Vec<CallArg>) -> Self {
        self.with_suffix(Suffix::Call(args))
    }
}

impl Expr {
    pub fn int(v: i64) -> Self {
        Expr::Literal(Literal::Integer(v))
    }

    pub fn real(v: f64) -> Self {
        Expr::Literal(Literal::Real(v))
    }

    pub fn string(v: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(v.into()))
    }

    pub fn boolean(v: bool) -> Self {
        Expr::Literal(Literal::Bool(v))
    }

    pub fn nil() -> Self {
        Expr::Literal(Literal::Nil)
    }

    pub fn list(items: Vec<Expr>) -> Self {
        Expr::Literal(Literal::List(items))
    }

    pub fn dict(entries: Vec<(Expr, Expr)>) -> Self {
        Expr::Literal(Literal::Dict(entries))
    }

    pub fn var(name: impl Into<Ident>) -> Self {
        Expr::Literal(Literal::Rvalue(Chain::var(name)))
    }

    pub fn chain(chain: Chain) -> Self {
        Expr::Literal(Literal::Rvalue(chain))
    }

    pub fn call(name: impl Into<Ident>, args: Vec<Expr>) -> Self {
        Expr::chain(Chain::var(name).call(args.into_iter().map(CallArg::Positional).collect()))
    }

    pub fn func(params: Vec<Param>, body: Block) -> Self {
        Expr::Literal(Literal::Func(FuncLiteral { params, body }))
    }

    pub fn var_block(body: Block) -> Self {
        Expr::Literal(Literal::VarBlock(body))
    }

    pub fn unary(op: impl Into<String>, operand: Expr) -> Self {
        Expr::Unary {
            op: Spanned::unspanned(op.into()),
            operand: Box::new(operand),
        }
    }

    /// Two-operand chain `lhs op rhs`.
    pub fn binary(lhs: Expr, op: impl Into<String>, rhs: Expr) -> Self {
        Expr::Chain {
            first: Box::new(lhs),
            rest: vec![BinaryTail {
                op: Spanned::unspanned(op.into()),
                operand: rhs,
            }],
        }
    }

    /// Extend a chain (or start one) with `op rhs`.
    pub fn then(self, op: impl Into<String>, rhs: Expr) -> Self {
        let tail = BinaryTail {
            op: Spanned::unspanned(op.into()),
            operand: rhs,
        };
        match self {
            Expr::Chain { first, mut rest } => {
                rest.push(tail);
                Expr::Chain { first, rest }
            }
            other => Expr::Chain {
                first: Box::new(other),
                rest: vec![tail],
            },
        }
    }
}

impl Param {
    pub fn new(name: impl Into<Ident>) -> Self {
        Self {
            name: Spanned::unspanned(name.into()),
            default: None,
        }
    }

    pub fn with_default(name: impl Into<Ident>, default: Expr) -> Self {
        Self {
            name: Spanned::unspanned(name.into()),
            default: Some(default),
        }
    }
}

impl Statement {
    /// `name = value;`
    pub fn assign_expr(name: impl Into<Ident>, value: Expr) -> Spanned<Statement> {
        Statement::assign_to(Chain::var(name), value)
    }

    /// `target = value;` for any lvalue chain.
    pub fn assign_to(target: Chain, value: Expr) -> Spanned<Statement> {
        Spanned::unspanned(Statement::Assign(AssignStmt {
            target,
            value: AssignValue::Block(vec![Statement::ret(value)]),
        }))
    }

    /// `name = { body }`
    pub fn assign_block(name: impl Into<Ident>, body: Block) -> Spanned<Statement> {
        Spanned::unspanned(Statement::Assign(AssignStmt {
            target: Chain::var(name),
            value: AssignValue::Block(body),
        }))
    }

    /// `name(params) { body }`
    pub fn def(name: impl Into<Ident>, params: Vec<Param>, body: Block) -> Spanned<Statement> {
        Spanned::unspanned(Statement::Assign(AssignStmt {
            target: Chain::var(name),
            value: AssignValue::Function { params, body },
        }))
    }

    pub fn expr(e: Expr) -> Spanned<Statement> {
        Spanned::unspanned(Statement::Expr(e))
    }

    pub fn ret(e: Expr) -> Spanned<Statement> {
        Spanned::unspanned(Statement::Return(e))
    }

    pub fn brk() -> Spanned<Statement> {
        Spanned::unspanned(Statement::Break)
    }

    pub fn cont() -> Spanned<Statement> {
        Spanned::unspanned(Statement::Continue)
    }

    pub fn for_in(var: impl Into<Ident>, iterable: Expr, body: Block) -> Spanned<Statement> {
        Spanned::unspanned(Statement::For(ForStmt {
            var: Spanned::unspanned(var.into()),
            iterable,
            body,
        }))
    }

    pub fn while_loop(condition: Expr, body: Block) -> Spanned<Statement> {
        Spanned::unspanned(Statement::While(WhileStmt { condition, body }))
    }

    pub fn if_chain(branches: Vec<(Expr, Block)>, else_body: Option<Block>) -> Spanned<Statement> {
        Spanned::unspanned(Statement::If(IfStmt {
            branches: branches
                .into_iter()
                .map(|(condition, body)| IfBranch { condition, body })
                .collect(),
            else_body,
        }))
    }

    /// `import a.b as alias`
    pub fn import(path: &str, alias: Option<&str>) -> Spanned<Statement> {
        Spanned::unspanned(Statement::Import(ImportStmt {
            items: vec![ImportItem {
                path: path.split('.').map(str::to_string).collect(),
                alias: alias.map(str::to_string),
                span: Span::default(),
            }],
        }))
    }

    /// `export name as alias`
    pub fn export(name: impl Into<Ident>, alias: Option<&str>) -> Spanned<Statement> {
        Spanned::unspanned(Statement::Export(ExportStmt {
            name: Spanned::unspanned(name.into()),
            alias: alias.map(str::to_string),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_local_name_defaults_to_last_segment() {
        let item = ImportItem {
            path: vec!["net".into(), "tcp".into()],
            alias: None,
            span: Span::default(),
        };
        assert_eq!(item.local_name(), Some("tcp"));
        assert_eq!(item.dotted_path(), "net.tcp");

        let aliased = ImportItem {
            alias: Some("sock".into()),
            ..item
        };
        assert_eq!(aliased.local_name(), Some("sock"));
    }

    #[test]
    fn then_extends_existing_chain() {
        let e = Expr::binary(Expr::var("a"), "+", Expr::var("b")).then("-", Expr::var("c"));
        match e {
            Expr::Chain { rest, .. } => {
                let ops: Vec<_> = rest.iter().map(|t| t.op.node.as_str()).collect();
                assert_eq!(ops, ["+", "-"]);
            }
            other => panic!("expected chain, got {other:?}"),
        }
    }

    #[test]
    fn tree_deserializes_from_json() {
        let json = r#"{
            "statements": [
                { "node": { "Export": { "name": { "node": "bar" }, "alias": null } } }
            ]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        match &program.statements[0].node {
            Statement::Export(e) => assert_eq!(e.foreign_name(), "bar"),
            other => panic!("expected export, got {other:?}"),
        }
    }
}
