//! Tests for `envi run`.

#![cfg(all(unix, feature = "test-kms"))]

use crate::support::*;

const RUN_YAML: &str = r#"env:
  production:
    - name: ENVI_CLI_MODE
      value: prod
    - name: ENVI_CLI_SHARED
      value: from-file
  developer:
    - name: ENVI_CLI_MODE
      value: dev
"#;

fn seeded() -> Test {
    let t = Test::new();
    assert_success(&t.init_cmd());
    assert_success(&t.edit_with(&replacing_editor(t.scratch.path(), RUN_YAML)));
    t
}

#[test]
fn test_run_exports_selected_environment() {
    let t = seeded();

    let output = t.run("developer", &["sh", "-c", "printf %s \"$ENVI_CLI_MODE\""]);
    assert_success(&output);
    assert_eq!(stdout(&output), "dev");

    let output = t.run("production", &["sh", "-c", "printf %s \"$ENVI_CLI_MODE\""]);
    assert_success(&output);
    assert_eq!(stdout(&output), "prod");
}

#[test]
fn test_run_keeps_existing_variable() {
    let t = seeded();

    let output = t
        .cmd()
        .env("ENVI_CLI_SHARED", "from-shell")
        .args(["run", "--env", "production", "--"])
        .args(["sh", "-c", "printf %s \"$ENVI_CLI_SHARED\""])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output), "from-shell");
}

#[test]
fn test_run_propagates_exit_code() {
    let t = seeded();

    let output = t.run("developer", &["sh", "-c", "exit 7"]);
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_run_missing_program() {
    let t = seeded();

    let output = t.run("developer", &["envi-test-no-such-program"]);
    assert_failure(&output);
}
