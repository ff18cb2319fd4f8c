//! Layering guardrails for the workspace crates.
//!
//! `pac_core` is a pure vocabulary crate and must stay dependency-free; `pac_syntax` is the tree contract and may
//! only depend on `serde`. These tests scan the member manifests and fail if either grows a dependency.

fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn vocabulary_crate_has_no_dependencies() {
    let manifest = include_str!("../crates/pac_core/Cargo.toml");
    assert!(dependency_names(manifest).is_empty(), "`pac_core` must not depend on other crates");
}

#[test]
fn syntax_crate_depends_only_on_serde() {
    let manifest = include_str!("../crates/pac_syntax/Cargo.toml");
    assert_eq!(dependency_names(manifest), ["serde"]);
}

#[test]
fn syntax_crate_does_not_depend_on_the_compiler() {
    let manifest = include_str!("../crates/pac_syntax/Cargo.toml");
    assert!(!dependency_names(manifest).iter().any(|n| n == "pac" || n == "pac_core"));
}
