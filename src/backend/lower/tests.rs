//! Lowering tests against a recording emitter that renders fragments as compact s-expressions.

use pac_core::lang::operators::{self, OperatorId};
use pac_syntax::ast::{CallArg, Chain, Expr, Param, Program, Spanned, Statement};

use super::Lowering;
use crate::backend::emit::{BlockParts, EmitError, Emitter, FunctionParts, ModuleParts, Place};
use crate::semantics::{Linkage, SemanticError};

#[derive(Default)]
struct Recorder;

impl Emitter for Recorder {
    type Fragment = String;

    fn nil(&mut self) -> String {
        "nil".into()
    }
    fn boolean(&mut self, value: bool) -> String {
        value.to_string()
    }
    fn integer(&mut self, value: i64) -> String {
        value.to_string()
    }
    fn real(&mut self, value: f64) -> String {
        format!("{value:?}")
    }
    fn string(&mut self, value: &str) -> String {
        format!("{value:?}")
    }
    fn list(&mut self, items: Vec<String>) -> String {
        format!("[{}]", items.join(" "))
    }
    fn dict(&mut self, entries: Vec<(String, String)>) -> String {
        let kv: Vec<String> = entries.into_iter().map(|(k, v)| format!("{k}:{v}")).collect();
        format!("{{{}}}", kv.join(" "))
    }
    fn function(&mut self, parts: FunctionParts<String>) -> String {
        let params: Vec<String> = parts
            .params
            .into_iter()
            .map(|p| match p.default {
                Some(d) => format!("{}={d}", p.name),
                None => p.name,
            })
            .collect();
        let this = parts.self_name.map(|n| format!(" self={n}")).unwrap_or_default();
        format!(
            "(fn ({}) [{}]{this} {})",
            params.join(" "),
            parts.captures.join(" "),
            parts.body.join(" ")
        )
    }
    fn value_block(&mut self, parts: BlockParts<String>) -> String {
        format!("(block [{}] {})", parts.captures.join(" "), parts.body.join(" "))
    }
    fn binary(&mut self, op: OperatorId, lhs: String, rhs: String) -> String {
        format!("({} {lhs} {rhs})", operators::as_str(op))
    }
    fn not(&mut self, operand: String) -> String {
        format!("(not {operand})")
    }
    fn read_var(&mut self, name: &str) -> String {
        name.to_string()
    }
    fn item(&mut self, base: String, index: String) -> String {
        format!("{base}[{index}]")
    }
    fn attr(&mut self, base: String, name: &str) -> String {
        format!("{base}.{name}")
    }
    fn call(&mut self, callee: String, positional: Vec<String>, keywords: Vec<(String, String)>) -> String {
        let mut args = positional;
        args.extend(keywords.into_iter().map(|(k, v)| format!("{k}={v}")));
        format!("{callee}({})", args.join(" "))
    }
    fn declare(&mut self, names: &[String]) -> String {
        format!("(declare {})", names.join(" "))
    }
    fn assign(&mut self, place: Place<String>, value: String) -> String {
        let place = match place {
            Place::Var(name) => name,
            Place::Item { base, index } => format!("{base}[{index}]"),
            Place::Attr { base, name } => format!("{base}.{name}"),
        };
        format!("(set {place} {value})")
    }
    fn expr_stmt(&mut self, value: String) -> String {
        value
    }
    fn if_else(&mut self, condition: String, then_body: Vec<String>, else_body: Option<Vec<String>>) -> String {
        match else_body {
            Some(e) => format!("(if {condition} {{{}}} {{{}}})", then_body.join(" "), e.join(" ")),
            None => format!("(if {condition} {{{}}})", then_body.join(" ")),
        }
    }
    fn for_index(&mut self, var: &str, iterable: String, body: Vec<String>) -> String {
        format!("(for {var} {iterable} {})", body.join(" "))
    }
    fn while_loop(&mut self, condition: String, body: Vec<String>) -> String {
        format!("(while {condition} {})", body.join(" "))
    }
    fn break_stmt(&mut self) -> String {
        "break".into()
    }
    fn continue_stmt(&mut self) -> String {
        "continue".into()
    }
    fn return_stmt(&mut self, value: String) -> String {
        format!("(return {value})")
    }
    fn unit_return(&mut self, value: String) -> String {
        format!("(end-init {value})")
    }
    fn import(&mut self, local: &str, path: &str, rebinds: bool) -> String {
        let verb = if rebinds { "reimport" } else { "import" };
        format!("({verb} {local} {path})")
    }
    fn finish_module(&mut self, parts: ModuleParts<'_, String>) -> Result<String, EmitError> {
        Ok(parts.body.join("\n"))
    }
}

fn lower(statements: Vec<Spanned<Statement>>) -> Result<String, SemanticError> {
    let mut emitter = Recorder;
    let mut lowering = Lowering::new(&mut emitter, ["print", "range"]);
    let body = lowering.lower_program(&Program::new(statements))?;
    assert!(lowering.scopes().is_top_level());
    Ok(body.join("\n"))
}

fn print(arg: Expr) -> Spanned<Statement> {
    Statement::expr(Expr::call("print", vec![arg]))
}

#[test]
fn assignment_declares_once() {
    let out = lower(vec![
        Statement::assign_expr("x", Expr::binary(Expr::int(1), "+", Expr::int(2))),
        Statement::assign_expr("x", Expr::var("x").then("*", Expr::int(3))),
    ])
    .unwrap();
    assert_eq!(out, "(declare x)\n(set x (+ 1 2))\n(set x (* x 3))");
}

#[test]
fn chains_fold_left_to_right() {
    let expr = Expr::int(1).then("-", Expr::int(2)).then("-", Expr::int(3)).then("mod", Expr::int(4));
    let out = lower(vec![print(expr)]).unwrap();
    assert_eq!(out, "print((mod (- (- 1 2) 3) 4))");
}

#[test]
fn unknown_and_unary_operators() {
    let err = lower(vec![print(Expr::binary(Expr::int(1), "&", Expr::int(2)))]).unwrap_err();
    assert!(matches!(err, SemanticError::UnknownOperator { ref op, .. } if op == "&"));

    let err = lower(vec![print(Expr::unary("-", Expr::int(2)))]).unwrap_err();
    assert!(matches!(err, SemanticError::UnsupportedUnary { ref op, .. } if op == "-"));

    let out = lower(vec![print(Expr::unary("not", Expr::boolean(true)))]).unwrap();
    assert_eq!(out, "print((not true))");
}

#[test]
fn loop_mutation_is_visible_after_the_loop() {
    let out = lower(vec![
        Statement::assign_expr("s", Expr::int(0)),
        Statement::for_in(
            "i",
            Expr::call("range", vec![Expr::int(1), Expr::int(3)]),
            vec![Statement::assign_expr("s", Expr::var("s").then("+", Expr::var("i")))],
        ),
        print(Expr::var("s")),
    ])
    .unwrap();
    assert_eq!(
        out,
        "(declare s)\n(set s 0)\n(for i range(1 3) (set s (+ s i)))\nprint(s)"
    );
}

#[test]
fn loop_variable_is_read_only() {
    let err = lower(vec![Statement::for_in(
        "i",
        Expr::list(vec![]),
        vec![Statement::assign_expr("i", Expr::int(1))],
    )])
    .unwrap_err();
    assert!(matches!(err, SemanticError::ReadOnly { ref name, .. } if name == "i"));
}

#[test]
fn names_first_assigned_in_a_loop_are_declared_inside_it() {
    let out = lower(vec![Statement::while_loop(
        Expr::boolean(true),
        vec![Statement::assign_expr("t", Expr::int(1)), Statement::brk()],
    )])
    .unwrap();
    assert_eq!(out, "(while true (declare t) (set t 1) break)");
}

#[test]
fn function_captures_and_params() {
    let out = lower(vec![
        Statement::assign_expr("y", Expr::int(10)),
        Statement::def(
            "f",
            vec![Param::new("a"), Param::with_default("b", Expr::var("a"))],
            vec![Statement::ret(Expr::var("a").then("+", Expr::var("b")).then("+", Expr::var("y")))],
        ),
    ])
    .unwrap();
    assert_eq!(
        out,
        "(declare y)\n(set y 10)\n(declare f)\n(set f (fn (a b=a) [y] (return (+ (+ a b) y))))"
    );
}

#[test]
fn outer_bindings_are_read_only_in_functions() {
    let err = lower(vec![
        Statement::assign_expr("y", Expr::int(1)),
        Statement::def("f", vec![], vec![Statement::assign_expr("y", Expr::int(2))]),
    ])
    .unwrap_err();
    assert!(matches!(err, SemanticError::ReadOnly { ref name, .. } if name == "y"));
}

#[test]
fn rebinding_a_writable_name_to_a_function() {
    let out = lower(vec![
        Statement::assign_expr("x", Expr::int(1)),
        Statement::def("x", vec![], vec![Statement::ret(Expr::int(2))]),
    ])
    .unwrap();
    assert_eq!(out, "(declare x)\n(set x 1)\n(set x (fn () [] (return 2)))");
}

#[test]
fn recursive_function_refers_to_itself() {
    let out = lower(vec![Statement::def(
        "fact",
        vec![Param::new("n")],
        vec![Statement::ret(Expr::call("fact", vec![Expr::var("n")]))],
    )])
    .unwrap();
    assert_eq!(out, "(declare fact)\n(set fact (fn (n) [] self=fact (return fact(n))))");
}

#[test]
fn value_blocks() {
    let out = lower(vec![
        Statement::assign_expr("a", Expr::int(1)),
        Statement::assign_block(
            "b",
            vec![
                Statement::assign_expr("t", Expr::var("a").then("*", Expr::int(2))),
                Statement::ret(Expr::var("t")),
            ],
        ),
    ])
    .unwrap();
    assert_eq!(
        out,
        "(declare a)\n(set a 1)\n(declare b)\n(set b (block [a] (declare t) (set t (* a 2)) (return t)))"
    );
}

#[test]
fn if_branches_fold_and_hoist() {
    let out = lower(vec![Statement::if_chain(
        vec![
            (Expr::boolean(true), vec![Statement::assign_expr("r", Expr::int(1))]),
            (Expr::boolean(false), vec![Statement::assign_expr("r", Expr::int(2))]),
        ],
        Some(vec![Statement::assign_expr("q", Expr::int(3))]),
    )])
    .unwrap();
    assert_eq!(
        out,
        "(declare r q)\n(if true {(set r 1)} {(if false {(set r 2)} {(set q 3)})})"
    );
}

#[test]
fn break_outside_loop() {
    let err = lower(vec![Statement::brk()]).unwrap_err();
    assert!(matches!(err, SemanticError::LoopControlOutsideLoop { ref keyword, .. } if keyword == "break"));

    // A function body inside a loop is not inside the loop.
    let err = lower(vec![Statement::while_loop(
        Expr::boolean(true),
        vec![Statement::def("f", vec![], vec![Statement::cont()])],
    )])
    .unwrap_err();
    assert!(matches!(err, SemanticError::LoopControlOutsideLoop { ref keyword, .. } if keyword == "continue"));
}

#[test]
fn lvalue_chains() {
    let out = lower(vec![
        Statement::assign_expr("d", Expr::dict(vec![])),
        Statement::assign_to(Chain::var("d").item(Expr::string("k")).attr("v"), Expr::int(1)),
    ])
    .unwrap();
    assert_eq!(out, "(declare d)\n(set d {})\n(set d[\"k\"].v 1)");

    let err = lower(vec![Statement::assign_to(
        Chain::var("print").call(vec![]).attr("x"),
        Expr::int(1),
    )])
    .unwrap_err();
    assert!(matches!(err, SemanticError::InvalidAssignTarget { ref name, .. } if name == "print"));
}

#[test]
fn keyword_arguments_follow_positional_ones() {
    let call = Expr::chain(Chain::var("print").call(vec![
        CallArg::Keyword {
            name: "end".into(),
            value: Expr::string(""),
        },
        CallArg::Positional(Expr::int(1)),
    ]));
    let out = lower(vec![Statement::expr(call)]).unwrap();
    assert_eq!(out, "print(1 end=\"\")");
}

#[test]
fn imports_and_exports() {
    let mut emitter = Recorder;
    let mut lowering = Lowering::new(&mut emitter, ["print"]);
    let program = Program::new(vec![
        Statement::import("net.tcp", None),
        Statement::export("bar", Some("baz")),
        Statement::assign_expr("bar", Expr::var("tcp")),
    ]);
    let body = lowering.lower_program(&program).unwrap();
    assert_eq!(body, ["(import tcp net.tcp)", "(set bar tcp)"]);

    let links = lowering.into_links();
    let entries: Vec<_> = links
        .entries()
        .iter()
        .map(|e| (e.foreign.as_str(), e.local.as_str(), e.linkage))
        .collect();
    assert_eq!(
        entries,
        [("net.tcp", "tcp", Linkage::Import), ("baz", "bar", Linkage::Export)]
    );
}

#[test]
fn module_boundary_errors() {
    let err = lower(vec![
        Statement::import("a.b", Some("x")),
        Statement::assign_expr("x", Expr::int(3)),
    ])
    .unwrap_err();
    assert!(matches!(err, SemanticError::ReadOnly { ref name, .. } if name == "x"));

    let err = lower(vec![
        Statement::assign_expr("foo", Expr::int(1)),
        Statement::export("foo", None),
    ])
    .unwrap_err();
    assert!(matches!(err, SemanticError::ExportRedefinition { ref name, .. } if name == "foo"));

    let err = lower(vec![Statement::if_chain(
        vec![(Expr::boolean(true), vec![Statement::import("a", None)])],
        None,
    )])
    .unwrap_err();
    assert!(matches!(err, SemanticError::NotTopLevel { ref construct, .. } if construct == "import"));

    let err = lower(vec![Statement::def("f", vec![], vec![Statement::export("g", None)])]).unwrap_err();
    assert!(matches!(err, SemanticError::NotTopLevel { ref construct, .. } if construct == "export"));

    let err = lower(vec![Statement::import("", None)]).unwrap_err();
    assert!(matches!(err, SemanticError::EmptyImport { .. }));
}

#[test]
fn importing_over_an_intrinsic_rebinds_it() {
    let out = lower(vec![Statement::import("io.print", None), print(Expr::int(1))]).unwrap();
    assert_eq!(out, "(reimport print io.print)\nprint(1)");
}

#[test]
fn top_level_return_ends_initialization() {
    // while true { return 1; } f() { return 2; } return 3;
    let out = lower(vec![
        Statement::while_loop(Expr::boolean(true), vec![Statement::ret(Expr::int(1))]),
        Statement::def("f", vec![], vec![Statement::ret(Expr::int(2))]),
        Statement::ret(Expr::int(3)),
    ])
    .unwrap();
    assert_eq!(
        out,
        "(while true (end-init 1))\n(declare f)\n(set f (fn () [] (return 2)))\n(end-init 3)"
    );
}

#[test]
fn duplicate_parameters_are_rejected() {
    let err = lower(vec![Statement::def(
        "f",
        vec![Param::new("a"), Param::new("a")],
        vec![],
    )])
    .unwrap_err();
    assert!(matches!(err, SemanticError::DuplicateParameter { ref name, .. } if name == "a"));
}
