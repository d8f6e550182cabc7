//! Typed wrapper over the cmux CLI.

pub mod focus;

use std::path::{Path, PathBuf};

use crate::common::runner::{CommandRunner, Invocation, QUERY_TIMEOUT};
use crate::config::BUNDLED_CMUX_PATH;

const RUNNING_COLOR: &str = "#34c759";

/// Locate the cmux binary: explicit override, then the app bundle, then `PATH`.
pub fn resolve_binary(runner: &dyn CommandRunner, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let bundled = Path::new(BUNDLED_CMUX_PATH);
    if is_executable(bundled) {
        return Some(bundled.to_path_buf());
    }
    runner.locate("cmux")
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// A resolved cmux binary plus the runner used to drive it.
/// Every method is best-effort and reports only success.
pub struct Cmux<'a> {
    runner: &'a dyn CommandRunner,
    bin: PathBuf,
}

impl<'a> Cmux<'a> {
    pub fn new(runner: &'a dyn CommandRunner, bin: PathBuf) -> Self {
        Self { runner, bin }
    }

    fn invocation<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(self.bin.clone(), args)
    }

    pub fn rename_workspace(&self, title: &str) -> bool {
        self.runner.run(&self.invocation(["rename-workspace", title]))
    }

    /// Silent sidebar intent line
    pub fn set_intent(&self, message: &str) -> bool {
        self.runner.run(&self.invocation(["set-status", "intent", message]))
    }

    pub fn set_attention(&self, message: &str) -> bool {
        self.runner.run(&self.invocation([
            "set-status",
            "attention",
            message,
            "--icon",
            "bell.fill",
        ]))
    }

    pub fn clear_attention(&self) -> bool {
        self.runner.run(&self.invocation(["clear-status", "attention"]))
    }

    pub fn set_running(&self) -> bool {
        self.runner.run(&self.invocation([
            "set-status",
            "running",
            "Running",
            "--color",
            RUNNING_COLOR,
            "--icon",
            "bolt.fill",
        ]))
    }

    pub fn clear_running(&self) -> bool {
        self.runner.run(&self.invocation(["clear-status", "running"]))
    }

    pub fn signal_session_start(&self) -> bool {
        self.runner
            .run(&self.invocation(["claude-hook", "session-start"]).stdin("{}"))
    }

    pub fn signal_stop(&self) -> bool {
        self.runner.run(&self.invocation(["claude-hook", "stop"]).stdin("{}"))
    }

    pub fn notify(&self, title: &str, subtitle: &str, body: &str) -> bool {
        let mut args = vec!["notify", "--title", title];
        if !subtitle.is_empty() {
            args.extend(["--subtitle", subtitle]);
        }
        if !body.is_empty() {
            args.extend(["--body", body]);
        }
        self.runner.run(&self.invocation(args))
    }

    /// Raw `identify --json` output
    pub fn identify(&self) -> Option<String> {
        self.runner
            .capture(&self.invocation(["identify", "--json"]).timeout(QUERY_TIMEOUT))
    }
}
