//! Test fixtures: documents and scripted editors.

use std::path::{Path, PathBuf};

/// Decrypted content of a freshly initialized file.
pub const INITIAL_YAML: &str = "env:\n  production:\n  - name: ''\n    value: ''\n  developer:\n  - name: ''\n    value: ''\n";

/// The initial document with only `developer[0].value` changed to `local`.
pub const DEVELOPER_LOCAL_YAML: &str = "env:\n  production:\n  - name: ''\n    value: ''\n  developer:\n  - name: ''\n    value: local\n";

/// Unsorted, multi-entry document.
pub const UNSORTED_YAML: &str = r#"env:
  production:
    - name: ZETA
      value: z
    - name: ALPHA
      value: a
  developer:
    - name: PORT
      value: "8080"
    - name: DATABASE_URL
      value: postgres://localhost/dev
"#;

/// Text that does not decode as a document.
pub const MALFORMED_YAML: &str = "env:\n  production: [\n    name: broken\n";

/// Write an executable editor script that replaces the edited file with
/// `content`. Returns the script path, usable as `EDITOR`.
#[cfg(unix)]
pub fn replacing_editor(dir: &Path, content: &str) -> PathBuf {
    let replacement = dir.join("replacement.yaml");
    std::fs::write(&replacement, content).expect("failed to write replacement");
    script(
        dir,
        "replace.sh",
        &format!("#!/bin/sh\ncp '{}' \"$1\"\n", replacement.display()),
    )
}

/// Editor script that exits with status 3 without touching the file.
#[cfg(unix)]
pub fn failing_editor(dir: &Path) -> PathBuf {
    script(dir, "fail.sh", "#!/bin/sh\nexit 3\n")
}

/// Editor script that deletes the buffer it was given.
#[cfg(unix)]
pub fn deleting_editor(dir: &Path) -> PathBuf {
    script(dir, "delete.sh", "#!/bin/sh\nrm -f \"$1\"\n")
}

/// Editor script that copies the buffer it was given to `capture`.
#[cfg(unix)]
pub fn capturing_editor(dir: &Path, capture: &Path) -> PathBuf {
    script(
        dir,
        "capture.sh",
        &format!("#!/bin/sh\ncp \"$1\" '{}'\n", capture.display()),
    )
}

#[cfg(unix)]
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).expect("failed to write editor script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("failed to chmod editor script");
    path
}
