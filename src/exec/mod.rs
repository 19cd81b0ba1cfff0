//! External command execution
//!
//! This module provides:
//! - `Invocation`: a program plus arguments, rendered for logs and errors
//! - `CommandOutput`: the captured result of a finished command
//! - `CommandRunner`: the seam every tool wrapper goes through
//! - `SystemRunner`: runs real processes with a per-command ceiling

mod system;

pub use system::{SystemRunner, DEFAULT_COMMAND_TIMEOUT};

use crate::error::ToolError;
use async_trait::async_trait;
use std::fmt;

/// A single external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: String,
    /// Arguments, passed without a shell
    pub args: Vec<String>,
}

impl Invocation {
    /// Create an invocation with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument (builder pattern)
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments (builder pattern)
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument only when `condition` holds
    pub fn arg_if(self, condition: bool, arg: impl Into<String>) -> Self {
        if condition {
            self.arg(arg)
        } else {
            self
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command that was executed
    pub command: String,
    /// Whether the command exited successfully
    pub success: bool,
    /// Exit code, absent when killed by a signal
    pub code: Option<i32>,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl CommandOutput {
    /// Create a successful output
    pub fn success(command: impl Into<String>, stdout: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failed output
    pub fn failure(command: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Convert a failed command into a `ToolError`, keeping successful output
    pub fn require(self) -> Result<Self, ToolError> {
        if self.success {
            Ok(self)
        } else {
            Err(ToolError::failed(self.command, self.code, self.stderr))
        }
    }

    /// Standard output followed by standard error, like `2>&1`
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&self.stderr);
        }
        combined
    }
}

/// Trait for running external commands
///
/// Implementations return `Ok` for every command that ran to completion,
/// whatever its exit status; `Err` is reserved for commands that could not
/// be started or hit the time limit.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command in the project directory and capture its output
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ToolError>;

    /// Run a command and fail on a non-zero exit
    async fn run_checked(&self, invocation: &Invocation) -> Result<CommandOutput, ToolError> {
        self.run(invocation).await?.require()
    }
}
