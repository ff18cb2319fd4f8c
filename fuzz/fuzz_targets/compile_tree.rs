#![no_main]

use libfuzzer_sys::fuzz_target;
use pac::backend::Compiler;
use pac::config::{BackendKind, CompileOptions};
use pac_syntax::ast::Program;

fuzz_target!(|data: &[u8]| {
    // Any tree that deserializes must compile or fail with an error, never panic.
    if let Ok(program) = serde_json::from_slice::<Program>(data) {
        for backend in [BackendKind::Rust, BackendKind::Cpp] {
            let _ = Compiler::new(CompileOptions::default().with_backend(backend)).compile(&program);
        }
    }
});
