//! Command helper methods for Test.

use super::{Test, KEY};
use assert_cmd::Command;
use std::path::Path;
use std::process::Output;

impl Test {
    /// Create an envi command isolated to this test.
    ///
    /// Returns a Command configured with:
    /// - current directory set to the test project directory
    /// - TMPDIR set to the scratch directory
    /// - ENVI_RESOURCE_ID set to the test key
    /// - colors disabled, EDITOR unset
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("envi").expect("failed to find envi binary");
        cmd.current_dir(self.dir.path());
        cmd.env("TMPDIR", self.scratch.path());
        cmd.env("ENVI_RESOURCE_ID", KEY);
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("EDITOR");
        cmd.env_remove("ENVI_LOG");
        cmd
    }

    /// Shortcut for `envi init`.
    pub fn init_cmd(&self) -> Output {
        self.cmd()
            .arg("init")
            .output()
            .expect("failed to run envi init")
    }

    /// Shortcut for `envi edit` with the given editor.
    pub fn edit_with(&self, editor: &Path) -> Output {
        self.cmd()
            .arg("edit")
            .env("EDITOR", editor)
            .output()
            .expect("failed to run envi edit")
    }

    /// Shortcut for `envi run --env <env> -- <command...>`.
    pub fn run(&self, env: &str, command: &[&str]) -> Output {
        self.cmd()
            .args(["run", "--env", env, "--"])
            .args(command)
            .output()
            .expect("failed to run envi run")
    }
}
