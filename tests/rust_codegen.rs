//! End-to-end checks of the Rust backend: syntax tree in, formatted Rust source out.
//!
//! Assertions look for individual lines of the generated module rather than pinning whole files, so they survive
//! formatter layout changes while still catching semantic regressions.

use pac::backend::Compiler;
use pac::config::CompileOptions;
use pac_syntax::ast::{CallArg, Chain, Expr, Param, Program, Spanned, Statement};

fn compile(statements: Vec<Spanned<Statement>>) -> String {
    compile_with(statements, CompileOptions::default())
}

fn compile_with(statements: Vec<Spanned<Statement>>, options: CompileOptions) -> String {
    let source = Compiler::new(options)
        .compile(&Program::new(statements))
        .expect("program should compile");
    syn::parse_file(&source).expect("generated module should be valid Rust");
    source
}

fn print(args: Vec<Expr>) -> Spanned<Statement> {
    Statement::expr(Expr::call("print", args))
}

#[test]
fn arithmetic_assignment() {
    let src = compile(vec![Statement::assign_expr(
        "x",
        Expr::binary(Expr::int(1), "+", Expr::int(2)),
    )]);
    assert!(src.contains("let mut x = Value::nil();"), "{src}");
    assert!(src.contains("x = __rt::add(Value::int(1), Value::int(2));"), "{src}");
}

#[test]
fn module_prelude_binds_intrinsics() {
    let src = compile(vec![]);
    assert!(src.contains("use pa_runtime as __rt;"), "{src}");
    assert!(src.contains("use pa_runtime::Value;"), "{src}");
    assert!(src.contains("pub fn pa_init() -> Value {"), "{src}");
    for name in ["nil", "range", "print", "input", "len"] {
        let line = format!("let {name} = __rt::intrinsic(\"{name}\");");
        assert!(src.contains(&line), "missing `{line}` in {src}");
    }
    assert!(src.contains("Value::dict([])"), "{src}");
    assert!(src.contains("fn main() -> std::process::ExitCode {"), "{src}");
}

#[test]
fn loop_accumulates_into_outer_variable() {
    // total = 0; for i in range(1, 3) { total = total + i; } print(total);
    let src = compile(vec![
        Statement::assign_expr("total", Expr::int(0)),
        Statement::for_in(
            "i",
            Expr::call("range", vec![Expr::int(1), Expr::int(3)]),
            vec![Statement::assign_expr("total", Expr::var("total").then("+", Expr::var("i")))],
        ),
        print(vec![Expr::var("total")]),
    ]);
    assert!(src.contains("let mut total = Value::nil();"), "{src}");
    assert!(src.contains("let __for_len = __rt::length(&__for_ref);"), "{src}");
    assert!(src.contains("total = __rt::add(total.clone(), i.clone());"), "{src}");
    assert!(src.contains("__rt::call(print.clone(), [total.clone()], []);"), "{src}");
    // The loop body shares storage with the enclosing scope: no second declaration of `total`.
    assert_eq!(src.matches("let mut total").count(), 1, "{src}");
}

#[test]
fn closures_capture_by_value() {
    // base = 10; add(a) { return a + base; }
    let src = compile(vec![
        Statement::assign_expr("base", Expr::int(10)),
        Statement::def(
            "add",
            vec![Param::new("a")],
            vec![Statement::ret(Expr::binary(Expr::var("a"), "+", Expr::var("base")))],
        ),
    ]);
    assert!(src.contains("let base = base.clone();"), "{src}");
    assert!(src.contains("Value::func(move |__args: __rt::Args| -> Value {"), "{src}");
    assert!(src.contains("__args.bind(0, \"a\")"), "{src}");
    assert!(src.contains("return __rt::add(a.clone(), base.clone());"), "{src}");
    // Parameters are not captures.
    assert!(!src.contains("let a = a.clone();"), "{src}");
}

#[test]
fn parameter_defaults_are_lazy() {
    // f(a, b = a) { return b; }
    let src = compile(vec![Statement::def(
        "f",
        vec![Param::new("a"), Param::with_default("b", Expr::var("a"))],
        vec![Statement::ret(Expr::var("b"))],
    )]);
    assert!(src.contains("__args.bind(1, \"b\").unwrap_or_else(|| a.clone())"), "{src}");
}

#[test]
fn rebinding_a_writable_name_to_a_function() {
    // f = 1; f() { return 2; }
    let src = compile(vec![
        Statement::assign_expr("f", Expr::int(1)),
        Statement::def("f", vec![], vec![Statement::ret(Expr::int(2))]),
    ]);
    assert_eq!(src.matches("let mut f = Value::nil();").count(), 1, "{src}");
    assert!(src.contains("f = {"), "{src}");
}

#[test]
fn recursive_functions_refer_to_themselves() {
    // fact(n) { if n < 2 { return 1; } return n * fact(n - 1); }
    let src = compile(vec![Statement::def(
        "fact",
        vec![Param::new("n")],
        vec![
            Statement::if_chain(
                vec![(
                    Expr::binary(Expr::var("n"), "<", Expr::int(2)),
                    vec![Statement::ret(Expr::int(1))],
                )],
                None,
            ),
            Statement::ret(Expr::binary(
                Expr::var("n"),
                "*",
                Expr::call("fact", vec![Expr::binary(Expr::var("n"), "-", Expr::int(1))]),
            )),
        ],
    )]);
    assert!(src.contains("Value::recursive_func("), "{src}");
    assert!(src.contains("let fact = __self;"), "{src}");
    assert!(!src.contains("let fact = fact.clone();"), "{src}");
    assert!(src.contains("if __rt::truthy(&__rt::lt(n.clone(), Value::int(2))) {"), "{src}");
}

#[test]
fn value_blocks_run_in_place() {
    // y = 2; x = var { z = y * 2; return z; }
    let src = compile(vec![
        Statement::assign_expr("y", Expr::int(2)),
        Statement::assign_expr(
            "x",
            Expr::var_block(vec![
                Statement::assign_expr("z", Expr::binary(Expr::var("y"), "*", Expr::int(2))),
                Statement::ret(Expr::var("z")),
            ]),
        ),
    ]);
    assert!(src.contains("let y = y.clone();"), "{src}");
    assert!(src.contains("(move || -> Value {"), "{src}");
    assert!(src.contains("let mut z = Value::nil();"), "{src}");
    assert!(src.contains("return z.clone();"), "{src}");
}

#[test]
fn calls_subscripts_and_attributes() {
    // xs = [1, 2]; xs[0] = xs.first; print(xs[1], sep = ",");
    let src = compile(vec![
        Statement::assign_expr("xs", Expr::list(vec![Expr::int(1), Expr::int(2)])),
        Statement::assign_to(
            Chain::var("xs").item(Expr::int(0)),
            Expr::chain(Chain::var("xs").attr("first")),
        ),
        Statement::expr(Expr::chain(Chain::var("print").call(vec![
            CallArg::Positional(Expr::chain(Chain::var("xs").item(Expr::int(1)))),
            CallArg::Keyword {
                name: "sep".into(),
                value: Expr::string(","),
            },
        ]))),
    ]);
    assert!(src.contains("xs = Value::list([Value::int(1), Value::int(2)]);"), "{src}");
    assert!(
        src.contains("__rt::set_item(&xs.clone(), Value::int(0), __rt::attr(xs.clone(), \"first\"));"),
        "{src}"
    );
    assert!(src.contains("[__rt::item(xs.clone(), Value::int(1))]"), "{src}");
    assert!(src.contains("[(\"sep\", Value::string(\",\"))]"), "{src}");
}

#[test]
fn imports_are_loaded_in_place() {
    let src = compile(vec![
        Statement::import("net.tcp", None),
        Statement::import("os.path", Some("p")),
    ]);
    assert!(src.contains("let tcp = __rt::import(\"net.tcp\");"), "{src}");
    assert!(src.contains("let p = __rt::import(\"os.path\");"), "{src}");
}

#[test]
fn exports_become_module_entries() {
    // export bar; export baz as qux; bar = 5; baz = bar;
    let src = compile_with(
        vec![
            Statement::export("bar", None),
            Statement::export("baz", Some("qux")),
            Statement::assign_expr("bar", Expr::int(5)),
            Statement::assign_expr("baz", Expr::var("bar")),
        ],
        CompileOptions::default().library(true).with_module_name("demo"),
    );
    assert!(src.contains("Compiled from Pa module `demo`."), "{src}");
    assert!(src.contains("let mut bar = Value::nil();"), "{src}");
    assert!(src.contains("let mut baz = Value::nil();"), "{src}");
    assert!(src.contains("bar = Value::int(5);"), "{src}");
    assert!(src.contains("(Value::string(\"bar\"), bar.clone())"), "{src}");
    assert!(src.contains("(Value::string(\"qux\"), baz.clone())"), "{src}");
    assert!(!src.contains("fn main()"), "{src}");
}

#[test]
fn top_level_return_keeps_the_export_table() {
    // export bar; bar = 1; while true { return 5; } f() { return bar; }
    let src = compile(vec![
        Statement::export("bar", None),
        Statement::assign_expr("bar", Expr::int(1)),
        Statement::while_loop(Expr::boolean(true), vec![Statement::ret(Expr::int(5))]),
        Statement::def("f", vec![], vec![Statement::ret(Expr::var("bar"))]),
    ]);
    assert!(src.contains("'init: {"), "{src}");
    assert!(src.contains("break 'init;"), "{src}");
    assert!(!src.contains("return Value::int(5);"), "{src}");
    // Returns inside functions are untouched.
    assert!(src.contains("return bar.clone();"), "{src}");
    assert!(src.contains("Value::dict([(Value::string(\"bar\"), bar.clone())])"), "{src}");
}

#[test]
fn keywords_and_prelude_names_are_escaped() {
    // match = 1; Some = match;
    let src = compile(vec![
        Statement::assign_expr("match", Expr::int(1)),
        Statement::assign_expr("Some", Expr::var("match")),
    ]);
    assert!(src.contains("let mut r#match = Value::nil();"), "{src}");
    assert!(src.contains("Some_ = r#match.clone();"), "{src}");
}

#[test]
fn while_with_break_and_not() {
    // n = 3; while not n == 0 { n = n - 1; if n == 1 { break; } }
    let src = compile(vec![
        Statement::assign_expr("n", Expr::int(3)),
        Statement::while_loop(
            Expr::unary("not", Expr::binary(Expr::var("n"), "==", Expr::int(0))),
            vec![
                Statement::assign_expr("n", Expr::binary(Expr::var("n"), "-", Expr::int(1))),
                Statement::if_chain(
                    vec![(Expr::binary(Expr::var("n"), "==", Expr::int(1)), vec![Statement::brk()])],
                    None,
                ),
            ],
        ),
    ]);
    assert!(src.contains("while __rt::truthy(&__rt::not(__rt::eq(n.clone(), Value::int(0)))) {"), "{src}");
    assert!(src.contains("break;"), "{src}");
}
