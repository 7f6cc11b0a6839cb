//! Assertions over finished `envi` runs and on-disk state.

use std::path::Path;
use std::process::Output;

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Both streams, for failure messages.
fn describe(output: &Output) -> String {
    format!(
        "status: {}\n--- stdout ---\n{}\n--- stderr ---\n{}",
        output.status,
        text(&output.stdout),
        text(&output.stderr)
    )
}

pub fn stdout(output: &Output) -> String {
    text(&output.stdout)
}

pub fn stderr(output: &Output) -> String {
    text(&output.stderr)
}

pub fn assert_success(output: &Output) {
    assert!(output.status.success(), "envi failed\n{}", describe(output));
}

pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "envi unexpectedly succeeded\n{}",
        describe(output)
    );
}

pub fn assert_stdout_contains(output: &Output, needle: &str) {
    assert!(
        stdout(output).contains(needle),
        "stdout lacks {:?}\n{}",
        needle,
        describe(output)
    );
}

pub fn assert_stderr_contains(output: &Output, needle: &str) {
    assert!(
        stderr(output).contains(needle),
        "stderr lacks {:?}\n{}",
        needle,
        describe(output)
    );
}

/// The encrypted file still holds exactly the bytes captured earlier.
pub fn assert_file_unchanged(path: &Path, before: &[u8]) {
    let now = std::fs::read(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    assert!(now == before, "{} was rewritten", path.display());
}
