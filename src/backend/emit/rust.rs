//! Reference backend: Pa → Rust source linked against `pa_runtime`.
//!
//! Fragments are `TokenStream`s built with `quote!`. The finished module is parsed back with `syn` and formatted with
//! `prettyplease`, so every emitted program is at least syntactically valid Rust.
//!
//! ## Generated shape
//!
//! ```text
//! use pa_runtime as __rt;
//! use pa_runtime::Value;
//!
//! pub fn pa_init() -> Value {
//!     let print = __rt::intrinsic("print");   // one per intrinsic
//!     let mut bar = Value::nil();            // one per export
//!     ...                                    // top-level statements, in `'init: { ... }` when one returns
//!     Value::dict([(Value::string("bar"), bar.clone())])
//! }
//!
//! fn main() -> std::process::ExitCode {      // programs only
//!     __rt::enter();
//!     __rt::leave(pa_init())
//! }
//! ```
//!
//! ## Notes
//! - Every variable is a `Value` handle; reads clone the handle, so aliasing follows the runtime's reference semantics.
//! - Closures are `move` closures preceded by `let name = name.clone();` for each captured name: captured state is
//!   the value at definition time.
//! - Pa identifiers are alphanumeric. Every name this backend introduces contains `_`, so renaming a clashing Pa
//!   identifier by appending `_` can never collide with another Pa identifier.

use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{format_ident, quote};

use pac_core::lang::operators::OperatorId;
use pac_core::lang::rust_keywords;

use super::{BlockParts, EmitError, Emitter, FunctionParts, ModuleParts, Place, operator_symbol};

/// Names that a `let` binding cannot shadow in the generated module (prelude variants and the runtime value type).
const PATTERN_NAMES: &[&str] = &["Value", "None", "Some", "Ok", "Err"];

/// Emit Rust source for one compilation unit.
#[derive(Debug, Default)]
pub struct RustEmitter {
    /// First problem seen while building fragments; reported by `finish_module`.
    error: Option<EmitError>,
    /// Set once a top-level `return` was emitted; the module body then runs inside the `'init` block.
    exits_early: bool,
}

impl RustEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, error: EmitError) {
        if self.error.is_none() {
            tracing::debug!(%error, "rust emission failed");
            self.error = Some(error);
        }
    }

    /// Spell a Pa identifier as a Rust identifier.
    fn ident(&mut self, name: &str) -> Ident {
        if !is_pa_identifier(name) {
            self.fail(EmitError::Unsupported(format!("`{name}` is not a valid Pa identifier")));
            return format_ident!("__invalid");
        }
        if rust_keywords::needs_rename(name) || PATTERN_NAMES.contains(&name) {
            format_ident!("{}_", name)
        } else if rust_keywords::is_keyword(name) {
            Ident::new_raw(name, Span::call_site())
        } else {
            Ident::new(name, Span::call_site())
        }
    }

    fn idents(&mut self, names: &[String]) -> Vec<Ident> {
        names.iter().map(|n| self.ident(n)).collect()
    }

    /// `let a = a.clone(); ...` for every captured name.
    fn capture_prelude(&mut self, captures: &[String]) -> TokenStream {
        let ids = self.idents(captures);
        quote! { #(let #ids = #ids.clone();)* }
    }
}

fn is_pa_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric())
}

impl Emitter for RustEmitter {
    type Fragment = TokenStream;

    fn nil(&mut self) -> TokenStream {
        quote! { Value::nil() }
    }

    fn boolean(&mut self, value: bool) -> TokenStream {
        quote! { Value::bool(#value) }
    }

    fn integer(&mut self, value: i64) -> TokenStream {
        let magnitude = Literal::u64_unsuffixed(value.unsigned_abs());
        if value < 0 {
            quote! { Value::int(-#magnitude) }
        } else {
            quote! { Value::int(#magnitude) }
        }
    }

    fn real(&mut self, value: f64) -> TokenStream {
        let lit = if value.is_nan() {
            quote! { f64::NAN }
        } else if value.is_infinite() {
            if value > 0.0 {
                quote! { f64::INFINITY }
            } else {
                quote! { f64::NEG_INFINITY }
            }
        } else {
            let magnitude = Literal::f64_unsuffixed(value.abs());
            if value.is_sign_negative() {
                quote! { -#magnitude }
            } else {
                quote! { #magnitude }
            }
        };
        quote! { Value::real(#lit) }
    }

    fn string(&mut self, value: &str) -> TokenStream {
        quote! { Value::string(#value) }
    }

    fn list(&mut self, items: Vec<TokenStream>) -> TokenStream {
        quote! { Value::list([#(#items),*]) }
    }

    fn dict(&mut self, entries: Vec<(TokenStream, TokenStream)>) -> TokenStream {
        let pairs = entries.into_iter().map(|(k, v)| quote! { (#k, #v) });
        quote! { Value::dict([#(#pairs),*]) }
    }

    fn function(&mut self, parts: FunctionParts<TokenStream>) -> TokenStream {
        let prelude = self.capture_prelude(&parts.captures);
        let mut params = Vec::with_capacity(parts.params.len());
        for (index, param) in parts.params.into_iter().enumerate() {
            let id = self.ident(&param.name);
            let key = param.name.as_str();
            let index = Literal::usize_unsuffixed(index);
            let default = param.default.unwrap_or_else(|| quote! { Value::nil() });
            params.push(quote! {
                let mut #id = __args.bind(#index, #key).unwrap_or_else(|| #default);
            });
        }
        let body = parts.body;
        match parts.self_name {
            Some(name) => {
                let this = self.ident(&name);
                quote! {
                    {
                        #prelude
                        Value::recursive_func(move |__self: Value, __args: __rt::Args| -> Value {
                            let #this = __self;
                            #(#params)*
                            #(#body)*
                            Value::nil()
                        })
                    }
                }
            }
            None => quote! {
                {
                    #prelude
                    Value::func(move |__args: __rt::Args| -> Value {
                        #(#params)*
                        #(#body)*
                        Value::nil()
                    })
                }
            },
        }
    }

    fn value_block(&mut self, parts: BlockParts<TokenStream>) -> TokenStream {
        let prelude = self.capture_prelude(&parts.captures);
        let body = parts.body;
        quote! {
            {
                #prelude
                (move || -> Value {
                    #(#body)*
                    Value::nil()
                })()
            }
        }
    }

    fn binary(&mut self, op: OperatorId, lhs: TokenStream, rhs: TokenStream) -> TokenStream {
        let f = format_ident!("{}", operator_symbol(op));
        quote! { __rt::#f(#lhs, #rhs) }
    }

    fn not(&mut self, operand: TokenStream) -> TokenStream {
        quote! { __rt::not(#operand) }
    }

    fn read_var(&mut self, name: &str) -> TokenStream {
        let id = self.ident(name);
        quote! { #id.clone() }
    }

    fn item(&mut self, base: TokenStream, index: TokenStream) -> TokenStream {
        quote! { __rt::item(#base, #index) }
    }

    fn attr(&mut self, base: TokenStream, name: &str) -> TokenStream {
        quote! { __rt::attr(#base, #name) }
    }

    fn call(
        &mut self,
        callee: TokenStream,
        positional: Vec<TokenStream>,
        keywords: Vec<(String, TokenStream)>,
    ) -> TokenStream {
        let keywords = keywords.iter().map(|(k, v)| quote! { (#k, #v) });
        quote! { __rt::call(#callee, [#(#positional),*], [#(#keywords),*]) }
    }

    fn declare(&mut self, names: &[String]) -> TokenStream {
        let ids = self.idents(names);
        quote! { #(let mut #ids = Value::nil();)* }
    }

    fn assign(&mut self, place: Place<TokenStream>, value: TokenStream) -> TokenStream {
        match place {
            Place::Var(name) => {
                let id = self.ident(&name);
                quote! { #id = #value; }
            }
            Place::Item { base, index } => quote! { __rt::set_item(&#base, #index, #value); },
            Place::Attr { base, name } => quote! { __rt::set_attr(&#base, #name, #value); },
        }
    }

    fn expr_stmt(&mut self, value: TokenStream) -> TokenStream {
        quote! { #value; }
    }

    fn if_else(
        &mut self,
        condition: TokenStream,
        then_body: Vec<TokenStream>,
        else_body: Option<Vec<TokenStream>>,
    ) -> TokenStream {
        let otherwise = else_body.map(|body| quote! { else { #(#body)* } });
        quote! {
            if __rt::truthy(&#condition) {
                #(#then_body)*
            } #otherwise
        }
    }

    fn for_index(&mut self, var: &str, iterable: TokenStream, body: Vec<TokenStream>) -> TokenStream {
        let id = self.ident(var);
        quote! {
            {
                let __for_ref = #iterable;
                let __for_len = __rt::length(&__for_ref);
                for __for_index in 0..__for_len {
                    let #id = __rt::item(__for_ref.clone(), Value::int(__for_index));
                    #(#body)*
                }
            }
        }
    }

    fn while_loop(&mut self, condition: TokenStream, body: Vec<TokenStream>) -> TokenStream {
        quote! {
            while __rt::truthy(&#condition) {
                #(#body)*
            }
        }
    }

    fn break_stmt(&mut self) -> TokenStream {
        quote! { break; }
    }

    fn continue_stmt(&mut self) -> TokenStream {
        quote! { continue; }
    }

    fn return_stmt(&mut self, value: TokenStream) -> TokenStream {
        quote! { return #value; }
    }

    fn unit_return(&mut self, value: TokenStream) -> TokenStream {
        self.exits_early = true;
        quote! {
            {
                #value;
                break 'init;
            }
        }
    }

    fn import(&mut self, local: &str, path: &str, _rebinds: bool) -> TokenStream {
        let id = self.ident(local);
        quote! { let #id = __rt::import(#path); }
    }

    fn finish_module(&mut self, parts: ModuleParts<'_, TokenStream>) -> Result<String, EmitError> {
        let intrinsic_ids = self.idents(parts.intrinsics);
        let intrinsic_names = parts.intrinsics.iter().map(String::as_str);

        let (export_locals, export_foreign): (Vec<String>, Vec<&str>) = parts
            .links
            .exports()
            .map(|e| (e.local.clone(), e.foreign.as_str()))
            .unzip();
        let export_ids = self.idents(&export_locals);

        if let Some(error) = self.error.take() {
            return Err(error);
        }

        let banner = parts
            .module_name
            .map(|name| {
                let doc = format!(" Compiled from Pa module `{name}`.");
                quote! { #![doc = #doc] }
            })
            .unwrap_or_default();
        let entry = (!parts.is_library).then(|| {
            quote! {
                fn main() -> std::process::ExitCode {
                    __rt::enter();
                    __rt::leave(pa_init())
                }
            }
        });
        let body = parts.body;
        let body = if self.exits_early {
            quote! { 'init: { #(#body)* } }
        } else {
            quote! { #(#body)* }
        };

        let tokens = quote! {
            #banner
            #![allow(unused_mut, unused_variables, unused_assignments, unreachable_code, non_snake_case, clippy::all)]

            use pa_runtime as __rt;
            use pa_runtime::Value;

            pub fn pa_init() -> Value {
                #(let #intrinsic_ids = __rt::intrinsic(#intrinsic_names);)*
                #(let mut #export_ids = Value::nil();)*
                #body
                Value::dict([#((Value::string(#export_foreign), #export_ids.clone())),*])
            }

            #entry
        };

        let syntax_tree: syn::File = syn::parse2(tokens).map_err(|e| EmitError::SynParse(e.to_string()))?;
        Ok(prettyplease::unparse(&syntax_tree))
    }
}
