//! Best-effort external command execution.
//!
//! Every subprocess the handler starts goes through [`CommandRunner`], so all
//! call sites share the same bounded timeout and failure semantics: errors are
//! logged and reported as `false`/`None`, never propagated.

use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::common::debug::debug_log;

/// Timeout for sidebar updates and notifications
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(3);
/// Timeout for focus queries
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// One external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
            timeout: COMMAND_TIMEOUT,
        }
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name plus arguments, for log lines
    pub fn describe(&self) -> String {
        let program = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.display().to_string());
        std::iter::once(program)
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
}

pub trait CommandRunner {
    /// Run to completion or until the invocation's timeout elapses.
    fn output(&self, invocation: &Invocation) -> Result<CommandOutput>;

    /// Resolve a program name on `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run and report only whether the command exited successfully.
    fn run(&self, invocation: &Invocation) -> bool {
        match self.output(invocation) {
            Ok(output) => {
                if !output.success {
                    debug_log(&format!("{} exited unsuccessfully", invocation.describe()));
                }
                output.success
            }
            Err(err) => {
                debug_log(&format!("{} failed: {:#}", invocation.describe(), err));
                false
            }
        }
    }

    /// Run and return stdout if the command exited successfully.
    fn capture(&self, invocation: &Invocation) -> Option<String> {
        match self.output(invocation) {
            Ok(output) if output.success => Some(output.stdout),
            Ok(_) => {
                debug_log(&format!("{} exited unsuccessfully", invocation.describe()));
                None
            }
            Err(err) => {
                debug_log(&format!("{} failed: {:#}", invocation.describe(), err));
                None
            }
        }
    }
}

/// Runs real processes on a single-threaded tokio runtime.
pub struct SystemRunner {
    runtime: tokio::runtime::Runtime,
}

impl SystemRunner {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start process runtime")?;
        Ok(Self { runtime })
    }

    async fn spawn_and_wait(invocation: &Invocation) -> Result<CommandOutput> {
        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn {}", invocation.program.display()))?;

        if let (Some(input), Some(mut pipe)) = (&invocation.stdin, child.stdin.take()) {
            // A child that exits without reading its input is not an error
            let _ = pipe.write_all(input.as_bytes()).await;
        }

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for child")?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        })
    }
}

impl CommandRunner for SystemRunner {
    fn output(&self, invocation: &Invocation) -> Result<CommandOutput> {
        if invocation.program.as_os_str().is_empty() {
            bail!("empty program path");
        }
        self.runtime.block_on(async {
            tokio::time::timeout(invocation.timeout, Self::spawn_and_wait(invocation))
                .await
                .map_err(|_| anyhow!("timed out after {:?}", invocation.timeout))?
        })
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}
