//! Process-backed command runner

use super::{CommandOutput, CommandRunner, Invocation};
use crate::error::ToolError;
use crate::progress::CommandSpinner;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Ceiling applied to every external command (5 minutes)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Runner that executes real commands in the project directory
#[derive(Debug, Clone)]
pub struct SystemRunner {
    /// Directory every command runs in
    working_dir: PathBuf,
    /// Per-command ceiling
    timeout: Duration,
    /// Whether to show a spinner while a command runs
    show_progress: bool,
}

impl SystemRunner {
    /// Create a runner for the given project directory
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            show_progress: false,
        }
    }

    /// Set the per-command ceiling
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ToolError> {
        let command = invocation.to_string();
        log::debug!("running `{}` in {}", command, self.working_dir.display());

        let spinner = CommandSpinner::start(self.show_progress, &command);

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, cmd.output()).await;
        drop(spinner);

        let output = match result {
            Err(_elapsed) => {
                return Err(ToolError::Timeout {
                    command,
                    limit: self.timeout,
                })
            }
            Ok(Err(source)) => return Err(ToolError::Spawn { command, source }),
            Ok(Ok(output)) => output,
        };

        let out = CommandOutput {
            command,
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        if !out.success {
            log::debug!("`{}` exited with {:?}", out.command, out.code);
        }
        Ok(out)
    }
}
