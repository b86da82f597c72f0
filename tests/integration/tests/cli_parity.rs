//! The headless host and the library agree byte for byte.

use std::path::PathBuf;

use assert_cmd::Command;
use luaform_core::Engine;
use predicates::prelude::*;
use tempfile::TempDir;

fn luaform_cmd() -> Command {
    let target_dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .parent()
                .and_then(|p| p.parent())
                .expect("Failed to find workspace root")
                .join("target")
        });
    Command::new(target_dir.join("debug/luaform"))
}

fn assert_same_json(source: &str, config: &str) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".luaform.jsonc"), config).unwrap();
    let expected = Engine::new().process_json(source, config).to_json();

    luaform_cmd()
        .current_dir(dir.path())
        .args(["process", "-", "--format", "json"])
        .write_stdin(source)
        .assert()
        .stdout(format!("{expected}\n"));
}

#[test]
fn successful_transformation() {
    assert_same_json(
        "local value = 10 * 10\nif value then print(value) end",
        r#"{ "generator": "dense", "rules": ["constant-folding", "identifier-renaming"] }"#,
    );
}

#[test]
fn parse_failure() {
    assert_same_json("print(\"abc", "{}");
}

#[test]
fn lenient_rollback() {
    assert_same_json(
        "local a = 1\nlocal a = 2",
        r#"{
            "mode": "lenient",
            "rules": [{ "rule": "identifier-renaming", "options": { "strategy": "shorten" } }]
        }"#,
    );
}

#[test]
fn config_failure_exits_with_one() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".luaform.jsonc"),
        r#"{ "rules": ["minify", "identifier-renaming"] }"#,
    )
    .unwrap();

    luaform_cmd()
        .current_dir(dir.path())
        .args(["process", "-"])
        .write_stdin("print(1)")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "rule 'identifier-renaming' must run before 'minify'",
        ));
}
