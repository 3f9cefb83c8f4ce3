//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a crossvault command running in the test directory.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("crossvault").expect("failed to find crossvault binary");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `crossvault init`.
    pub fn init_cmd(&self) -> Output {
        self.cmd()
            .arg("init")
            .output()
            .expect("failed to run crossvault init")
    }

    /// Shortcut for `crossvault set` with `--force`.
    pub fn set(&self, key: &str, val: &str, context: &str) -> Output {
        self.cmd()
            .args(["set", key, val, "--context", context, "--force"])
            .output()
            .expect("failed to run crossvault set")
    }

    /// Shortcut for `crossvault set --secure --force`.
    pub fn set_secure(&self, key: &str, val: &str, context: &str) -> Output {
        self.cmd()
            .args(["set", key, val, "--context", context, "--secure", "--force"])
            .output()
            .expect("failed to run crossvault set --secure")
    }

    /// Shortcut for `crossvault get`.
    pub fn get(&self, key: &str, context: &str) -> Output {
        self.cmd()
            .args(["get", key, "--context", context])
            .output()
            .expect("failed to run crossvault get")
    }

    /// Shortcut for `crossvault get --reveal`.
    pub fn get_reveal(&self, key: &str, context: &str) -> Output {
        self.cmd()
            .args(["get", key, "--context", context, "--reveal"])
            .output()
            .expect("failed to run crossvault get --reveal")
    }

    /// Shortcut for `crossvault rm`.
    pub fn rm(&self, key: &str, context: &str) -> Output {
        self.cmd()
            .args(["rm", key, "--context", context])
            .output()
            .expect("failed to run crossvault rm")
    }

    /// Shortcut for `crossvault list`.
    pub fn list(&self, context: &str) -> Output {
        self.cmd()
            .args(["list", "--context", context])
            .output()
            .expect("failed to run crossvault list")
    }

    /// Shortcut for `crossvault copy KEY --from A --to B`.
    pub fn copy(&self, key: &str, from: &str, to: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["copy", key, "--from", from, "--to", to]);
        cmd.args(extra);
        cmd.output().expect("failed to run crossvault copy")
    }

    /// Shortcut for bulk `crossvault copy --only ...`.
    pub fn copy_bulk(&self, from: &str, to: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["copy", "--from", from, "--to", to]);
        cmd.args(extra);
        cmd.output().expect("failed to run crossvault copy (bulk)")
    }

    /// Shortcut for `crossvault diff`.
    pub fn diff(&self, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.arg("diff");
        cmd.args(extra);
        cmd.output().expect("failed to run crossvault diff")
    }

    /// Shortcut for `crossvault merge --template ... --environment ...`.
    pub fn merge(&self, template: &str, environment: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["merge", "--template", template, "--environment", environment]);
        cmd.args(extra);
        cmd.output().expect("failed to run crossvault merge")
    }
}
