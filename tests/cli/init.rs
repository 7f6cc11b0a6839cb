//! Tests for `envi init`.

#![cfg(feature = "test-kms")]

use crate::support::*;
use std::fs;

#[test]
fn test_init_creates_encrypted_file() {
    let t = Test::new();

    let output = t.init_cmd();
    assert_success(&output);
    assert_stdout_contains(&output, "initialized");
    assert_stderr_contains(&output, "envi edit");

    let raw = fs::read(t.envi_file()).unwrap();
    assert!(!raw.is_empty());
    assert!(!String::from_utf8_lossy(&raw).contains("production"));
}

#[cfg(unix)]
#[test]
fn test_init_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::new();
    assert_success(&t.init_cmd());

    let mode = fs::metadata(t.envi_file()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_init_twice_fails() {
    let t = Test::new();
    assert_success(&t.init_cmd());
    let before = fs::read(t.envi_file()).unwrap();

    let output = t.init_cmd();
    assert_failure(&output);
    assert_stderr_contains(&output, "already initialized");
    assert_file_unchanged(&t.envi_file(), &before);
}

#[test]
fn test_init_below_existing_file_fails() {
    let t = Test::new();
    assert_success(&t.init_cmd());
    let nested = t.dir.path().join("sub");
    fs::create_dir(&nested).unwrap();

    let output = t.cmd().current_dir(&nested).arg("init").output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "already initialized");
    assert!(!nested.join("envi.yaml").exists());
}

#[test]
fn test_init_alias() {
    let t = Test::new();
    assert_success(&t.cmd().arg("i").output().unwrap());
    assert!(t.envi_file().exists());
}

#[test]
fn test_init_with_resource_id_flag() {
    let t = Test::new();
    let output = t
        .cmd()
        .args(["init", "--resource-id", KEY])
        .env_remove("ENVI_RESOURCE_ID")
        .output()
        .unwrap();

    assert_success(&output);
    assert!(t.envi_file().exists());
}
