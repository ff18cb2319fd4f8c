//! Alternate backend: Pa → C++ against the `palang.h` runtime.
//!
//! Fragments are plain strings. The output keeps the historical single-line layout: a banner and include, one global
//! per export, an `extern "C"` initializer that returns the export dictionary, and an optional `main`.
//!
//! Lambdas capture by value (`[=]`), which never reaches namespace-scope globals. `PA_INIT` therefore works on a local
//! of the same name for every export and copies it into the global before returning, so closures snapshot exported
//! slots like any other variable.

use std::fmt::Write as _;

use pac_core::lang::operators::OperatorId;

use super::{BlockParts, EmitError, Emitter, FunctionParts, ModuleParts, Place};

const HEADER: &str = "/* Automatically compiled from Pa language */\n#include <palang.h>";
const ENTRYPOINT: &str = "int main(int argc,char**argv,char**env){PA_ENTER(argc,argv,env);return PA_LEAVE(PA_INIT());}";

/// Names the generated code or `palang.h` already uses; Pa identifiers spelled like these get a trailing `_`.
///
/// Keywords and alternative tokens that contain `_` are left out: Pa identifiers are alphanumeric.
const RESERVED: &[&str] = &[
    // keywords
    "alignas", "alignof", "asm", "auto", "bool", "break", "case", "catch", "char", "class", "concept", "const",
    "consteval", "constexpr", "constinit", "continue", "decltype", "default", "delete", "do", "double", "else",
    "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "mutable", "namespace", "new", "noexcept", "nullptr", "operator", "private", "protected", "public", "register",
    "requires", "return", "short", "signed", "sizeof", "static", "struct", "switch", "template", "this", "throw",
    "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void", "volatile",
    "while",
    // alternative operator tokens
    "and", "bitand", "bitor", "compl", "not", "or", "xor",
    // standard library macros, including the ones `real` emits
    "NULL", "NAN", "INFINITY", "EOF", "assert", "errno", "stdin", "stdout", "stderr",
    // runtime and entry point
    "list", "map", "string", "function", "pool", "exit", "printf", "main",
];

/// Emit C++ source for one compilation unit.
#[derive(Debug, Default)]
pub struct CppEmitter {
    error: Option<EmitError>,
    /// Set once a top-level `return` jumps to the end of `PA_INIT`.
    exits_early: bool,
}

impl CppEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn ident(&mut self, name: &str) -> String {
        let mut chars = name.chars();
        let valid =
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric());
        if !valid {
            if self.error.is_none() {
                self.error = Some(EmitError::Unsupported(format!("`{name}` is not a valid Pa identifier")));
            }
            return "__invalid".to_string();
        }
        if RESERVED.contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }

    fn params_and_body(&mut self, parts: FunctionParts<String>) -> String {
        let mut src = String::new();
        for (index, param) in parts.params.into_iter().enumerate() {
            let id = self.ident(&param.name);
            let default = param.default.unwrap_or_else(|| "pa_new_nil()".to_string());
            let _ = write!(
                src,
                "pa_value_t* {id}=pa_get_argument(__args,__kwargs,{index},{},{default});",
                string_literal(&param.name)
            );
        }
        src.extend(parts.body);
        src
    }
}

fn function_name(op: OperatorId) -> &'static str {
    match op {
        OperatorId::Add => "pa_operator_add",
        OperatorId::Sub => "pa_operator_subtract",
        OperatorId::Mul => "pa_operator_multiply",
        OperatorId::Div => "pa_operator_divide",
        OperatorId::Mod => "pa_operator_modulo",
        OperatorId::Pow => "pa_operator_power",
        OperatorId::Eq => "pa_operator_eq",
        OperatorId::NotEq => "pa_operator_neq",
        OperatorId::Gt => "pa_operator_gt",
        OperatorId::GtEq => "pa_operator_gte",
        OperatorId::Lt => "pa_operator_lt",
        OperatorId::LtEq => "pa_operator_lte",
        OperatorId::Right => "pa_operator_right",
        OperatorId::Left => "pa_operator_left",
        OperatorId::And => "pa_operator_and",
        OperatorId::Or => "pa_operator_or",
        OperatorId::Not => "pa_operator_not",
    }
}

/// Quote `value` as a C++ string literal.
fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Octal escapes have a fixed width, unlike `\x`.
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

const INIT_DONE: &str = "__init_done";

const LAMBDA: &str = "[=](pa_value_t* __args,pa_value_t* __kwargs)->pa_value_t*";

impl Emitter for CppEmitter {
    type Fragment = String;

    fn nil(&mut self) -> String {
        "pa_new_nil()".to_string()
    }

    fn boolean(&mut self, value: bool) -> String {
        format!("pa_new_boolean({value})")
    }

    fn integer(&mut self, value: i64) -> String {
        if value == i64::MIN {
            // The literal 9223372036854775808 does not fit int64_t.
            "pa_new_integer(INT64_MIN)".to_string()
        } else {
            format!("pa_new_integer({value})")
        }
    }

    fn real(&mut self, value: f64) -> String {
        let lit = if value.is_nan() {
            "NAN".to_string()
        } else if value.is_infinite() {
            if value > 0.0 { "INFINITY" } else { "-INFINITY" }.to_string()
        } else {
            format!("{value:?}")
        };
        format!("pa_new_float({lit})")
    }

    fn string(&mut self, value: &str) -> String {
        format!("pa_new_string({})", string_literal(value))
    }

    fn list(&mut self, items: Vec<String>) -> String {
        format!("pa_new_list({})", items.join(","))
    }

    fn dict(&mut self, entries: Vec<(String, String)>) -> String {
        let kvs: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("pa_new_dictionary_kv({k},{v})"))
            .collect();
        format!("pa_new_dictionary({})", kvs.join(","))
    }

    fn function(&mut self, parts: FunctionParts<String>) -> String {
        match parts.self_name.clone() {
            Some(name) => {
                // The lambda refers to itself through a heap slot filled after construction.
                let this = self.ident(&name);
                let body = self.params_and_body(parts);
                format!(
                    "([=]()->pa_value_t*{{pa_value_t* __self=new pa_value_t;*__self=*pa_new_function({LAMBDA}{{pa_value_t* {this}=__self;{body}return pa_new_nil();}});return __self;}})()"
                )
            }
            None => {
                let body = self.params_and_body(parts);
                format!("pa_new_function({LAMBDA}{{{body}return pa_new_nil();}})")
            }
        }
    }

    fn value_block(&mut self, parts: BlockParts<String>) -> String {
        format!("([=]()->pa_value_t*{{{}return pa_new_nil();}})()", parts.body.concat())
    }

    fn binary(&mut self, op: OperatorId, lhs: String, rhs: String) -> String {
        format!("{}({lhs},{rhs})", function_name(op))
    }

    fn not(&mut self, operand: String) -> String {
        format!("pa_operator_not({operand})")
    }

    fn read_var(&mut self, name: &str) -> String {
        self.ident(name)
    }

    fn item(&mut self, base: String, index: String) -> String {
        format!("pa_operator_getitem({base},{index})")
    }

    fn attr(&mut self, base: String, name: &str) -> String {
        format!("pa_operator_getattr({base},{})", string_literal(name))
    }

    fn call(&mut self, callee: String, positional: Vec<String>, keywords: Vec<(String, String)>) -> String {
        let kwargs: Vec<String> = keywords
            .iter()
            .map(|(k, v)| format!("pa_new_dictionary_kv(pa_new_string({}),{v})", string_literal(k)))
            .collect();
        format!(
            "pa_function_call({callee},pa_new_list({}),pa_new_dictionary({}))",
            positional.join(","),
            kwargs.join(",")
        )
    }

    fn declare(&mut self, names: &[String]) -> String {
        names
            .iter()
            .map(|n| format!("pa_value_t* {}=pa_new_nil();", self.ident(n)))
            .collect()
    }

    fn assign(&mut self, place: Place<String>, value: String) -> String {
        match place {
            Place::Var(name) => format!("{}={value};", self.ident(&name)),
            Place::Item { base, index } => format!("pa_operator_setitem({base},{index},{value});"),
            Place::Attr { base, name } => format!("pa_operator_setattr({base},{},{value});", string_literal(&name)),
        }
    }

    fn expr_stmt(&mut self, value: String) -> String {
        format!("{value};")
    }

    fn if_else(&mut self, condition: String, then_body: Vec<String>, else_body: Option<Vec<String>>) -> String {
        let mut src = format!("if(pa_evaluate_into_boolean({condition})){{{}}}", then_body.concat());
        if let Some(body) = else_body {
            let _ = write!(src, "else{{{}}}", body.concat());
        }
        src
    }

    fn for_index(&mut self, var: &str, iterable: String, body: Vec<String>) -> String {
        let id = self.ident(var);
        format!(
            "{{pa_value_t* __for_ref={iterable};pa_value_t* __for_len=pa_operator_length(__for_ref);\
             for(int64_t __for_index=0;__for_index<__for_len->value.i64;__for_index++){{\
             pa_value_t* {id}=pa_operator_getitem(__for_ref,pa_new_integer(__for_index));{}}}}}",
            body.concat()
        )
    }

    fn while_loop(&mut self, condition: String, body: Vec<String>) -> String {
        format!("while(pa_evaluate_into_boolean({condition})){{{}}}", body.concat())
    }

    fn break_stmt(&mut self) -> String {
        "break;".to_string()
    }

    fn continue_stmt(&mut self) -> String {
        "continue;".to_string()
    }

    fn return_stmt(&mut self, value: String) -> String {
        format!("return {value};")
    }

    fn unit_return(&mut self, value: String) -> String {
        self.exits_early = true;
        format!("{{{value};goto {INIT_DONE};}}")
    }

    fn import(&mut self, local: &str, path: &str, rebinds: bool) -> String {
        let id = self.ident(local);
        let path = string_literal(path);
        if rebinds {
            format!("{id}=pa_import({path});")
        } else {
            format!("pa_value_t* {id}=pa_import({path});")
        }
    }

    fn finish_module(&mut self, parts: ModuleParts<'_, String>) -> Result<String, EmitError> {
        let mut intrinsics = String::new();
        for name in parts.intrinsics {
            let id = self.ident(name);
            let _ = write!(intrinsics, "pa_value_t* {id}=pa_intrinsic({});", string_literal(name));
        }
        let mut globals = String::new();
        let mut locals = String::new();
        let mut publish = String::new();
        let mut table = Vec::new();
        for entry in parts.links.exports() {
            let id = self.ident(&entry.local);
            let _ = write!(globals, "pa_value_t* {id};");
            let _ = write!(locals, "pa_value_t* {id}=pa_new_nil();");
            let _ = write!(publish, "::{id}={id};");
            table.push(format!("pa_new_dictionary_kv(pa_new_string({}),{id})", string_literal(&entry.foreign)));
        }
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        let mut src = String::from(HEADER);
        if let Some(name) = parts.module_name {
            let _ = write!(src, "\n/* Pa module {} */", name.replace("*/", "* /"));
        }
        let body = parts.body.concat();
        // Declarations in the body go out of scope before the label, so the jump skips no initialization.
        let body = if self.exits_early { format!("{{{body}}}{INIT_DONE}:;") } else { body };
        let _ = write!(
            src,
            "\n{globals}extern \"C\" pa_value_t* PA_INIT(){{{intrinsics}{locals}{body}{publish}return pa_new_dictionary({});}}",
            table.join(",")
        );
        if !parts.is_library {
            src.push_str(ENTRYPOINT);
        }
        Ok(src)
    }
}
