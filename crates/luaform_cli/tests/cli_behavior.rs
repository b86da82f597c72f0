//! Integration tests for CLI behavior
//!
//! These tests run the `luaform` binary and check what a user sees:
//! stdout, stderr, exit codes and files on disk.

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Helper to create a command for the luaform CLI
fn luaform_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_luaform"));
    cmd.current_dir(dir.path());
    cmd
}

mod help_command {
    use super::*;

    #[test]
    fn shows_help_with_flag() {
        let dir = TempDir::new().unwrap();
        luaform_cmd(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"));
    }

    #[test]
    fn shows_version_with_flag() {
        let dir = TempDir::new().unwrap();
        luaform_cmd(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}

mod process_command {
    use super::*;

    fn with_config(dir: &TempDir, config: &str) {
        dir.child(".luaform.jsonc").write_str(config).unwrap();
    }

    #[test]
    fn folds_constants_from_discovered_config() {
        let dir = TempDir::new().unwrap();
        with_config(&dir, r#"{ "rules": ["constant-folding"] }"#);
        dir.child("main.lua").write_str("local x = 1 + 2").unwrap();

        luaform_cmd(&dir)
            .args(["process", "main.lua"])
            .assert()
            .success()
            .stdout("local x = 3");
    }

    #[test]
    fn reads_standard_input() {
        let dir = TempDir::new().unwrap();
        luaform_cmd(&dir)
            .args(["process", "-"])
            .write_stdin("print( 1 )")
            .assert()
            .success()
            .stdout("print(1)");
    }

    #[test]
    fn explicit_config_path_wins() {
        let dir = TempDir::new().unwrap();
        with_config(&dir, r#"{ "rules": ["no-such-rule"] }"#);
        dir.child("custom.json")
            .write_str(r#"{ "rules": ["dead-branch-elimination"] }"#)
            .unwrap();

        luaform_cmd(&dir)
            .args(["--config", "custom.json", "process", "-"])
            .write_stdin("if false then print(\"x\") end")
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn reports_parse_errors_with_position() {
        let dir = TempDir::new().unwrap();
        luaform_cmd(&dir)
            .args(["process", "-"])
            .write_stdin("print(\"abc")
            .assert()
            .code(1)
            .stdout("")
            .stderr(predicate::str::contains("input.lua:1:7: error[parse]"));
    }

    #[test]
    fn unknown_rule_is_a_config_failure() {
        let dir = TempDir::new().unwrap();
        with_config(&dir, r#"{ "rules": ["no-such-rule"] }"#);

        luaform_cmd(&dir)
            .args(["process", "-"])
            .write_stdin("print(1)")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("error[config]: unknown rule 'no-such-rule'"));
    }

    #[test]
    fn lenient_flag_keeps_going() {
        let dir = TempDir::new().unwrap();
        with_config(
            &dir,
            r#"{
                // redeclarations make renaming fail
                "rules": [{ "rule": "identifier-renaming", "options": { "strategy": "shorten" } }]
            }"#,
        );

        luaform_cmd(&dir)
            .args(["process", "-", "--lenient"])
            .write_stdin("local a = 1\nlocal a = 2")
            .assert()
            .success()
            .stdout("local a = 1\nlocal a = 2")
            .stderr(predicate::str::contains("warning[rule]"));

        luaform_cmd(&dir)
            .args(["process", "-", "--strict"])
            .write_stdin("local a = 1\nlocal a = 2")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("error[rule]"));
    }

    #[test]
    fn dense_mode_flag() {
        let dir = TempDir::new().unwrap();
        luaform_cmd(&dir)
            .args(["process", "-", "--mode", "dense"])
            .write_stdin("local x = 1\nprint(x)")
            .assert()
            .success()
            .stdout("local x=1 print(x)");
    }

    #[test]
    fn dense_mode_flag_keeps_configured_column_span() {
        let dir = TempDir::new().unwrap();
        let config = r#"{ "generator": { "name": "dense", "column_span": 12 } }"#;
        with_config(&dir, config);
        let source = "local alpha = 1\nlocal beta = 2";

        let expected = luaform_core::Engine::new()
            .process_json(source, config)
            .output
            .unwrap();
        assert!(expected.contains('\n'));

        luaform_cmd(&dir)
            .args(["process", "-", "--mode", "dense"])
            .write_stdin(source)
            .assert()
            .success()
            .stdout(expected);
    }

    #[test]
    fn json_output_matches_library() {
        let dir = TempDir::new().unwrap();
        let config = r#"{ "rules": ["constant-folding"] }"#;
        with_config(&dir, config);
        let source = "return 2 ^ 10";

        let expected = luaform_core::Engine::new()
            .process_json(source, config)
            .to_json();

        luaform_cmd(&dir)
            .args(["process", "-", "--format", "json"])
            .write_stdin(source)
            .assert()
            .success()
            .stdout(format!("{expected}\n"));
    }

    #[test]
    fn writes_output_file() {
        let dir = TempDir::new().unwrap();
        dir.child("main.lua").write_str("local  y = 2").unwrap();

        luaform_cmd(&dir)
            .args(["process", "main.lua", "--output", "out.lua"])
            .assert()
            .success()
            .stdout("");

        dir.child("out.lua").assert("local y = 2");
    }

    #[test]
    fn program_text_is_written_unchanged() {
        let dir = TempDir::new().unwrap();
        let config = r#"{ "rules": ["constant-folding"] }"#;
        with_config(&dir, config);
        let source = "local x = 1 + 2\n-- trailing comment";
        dir.child("main.lua").write_str(source).unwrap();

        let expected = luaform_core::Engine::new()
            .process_json(source, config)
            .output
            .unwrap();

        luaform_cmd(&dir)
            .args(["process", "main.lua"])
            .assert()
            .success()
            .stdout(expected.clone());

        luaform_cmd(&dir)
            .args(["process", "main.lua", "--output", "out.lua"])
            .assert()
            .success();
        dir.child("out.lua").assert(expected);
    }

    #[test]
    fn missing_input_is_a_host_error() {
        let dir = TempDir::new().unwrap();
        luaform_cmd(&dir)
            .args(["process", "missing.lua"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Failed to read missing.lua"));
    }

    #[test]
    fn rejects_conflicting_flags() {
        let dir = TempDir::new().unwrap();
        luaform_cmd(&dir)
            .args(["process", "-", "--strict", "--lenient"])
            .assert()
            .failure();
    }
}

mod rules_command {
    use super::*;

    #[test]
    fn lists_rules_with_ordering() {
        let dir = TempDir::new().unwrap();
        luaform_cmd(&dir)
            .arg("rules")
            .assert()
            .success()
            .stdout(predicate::str::contains("constant-folding"))
            .stdout(predicate::str::contains("runs before: minify"));
    }
}

mod init_command {
    use super::*;

    #[test]
    fn creates_new_config_file() {
        let dir = TempDir::new().unwrap();

        luaform_cmd(&dir)
            .arg("init")
            .assert()
            .success()
            .stderr(predicate::str::contains("Created .luaform.jsonc"));

        dir.child(".luaform.jsonc")
            .assert(predicate::str::contains("\"rules\": []"));
    }

    #[test]
    fn fails_when_config_exists_without_force() {
        let dir = TempDir::new().unwrap();
        dir.child(".luaform.jsonc").write_str("{}").unwrap();

        luaform_cmd(&dir)
            .arg("init")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("already exists"));

        dir.child(".luaform.jsonc").assert("{}");
    }

    #[test]
    fn overwrites_with_force() {
        let dir = TempDir::new().unwrap();
        dir.child(".luaform.jsonc").write_str("{}").unwrap();

        luaform_cmd(&dir).args(["init", "--force"]).assert().success();

        dir.child(".luaform.jsonc")
            .assert(predicate::str::contains("\"mode\": \"strict\""));
    }
}
