//! Git adapter

use crate::config::ToolPaths;
use crate::error::ToolError;
use crate::exec::{CommandRunner, Invocation};

/// Git adapter
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    tools: &'a ToolPaths,
}

impl<'a> Git<'a> {
    /// Create a new Git adapter
    pub fn new(runner: &'a dyn CommandRunner, tools: &'a ToolPaths) -> Self {
        Self { runner, tools }
    }

    fn command(&self) -> Invocation {
        Invocation::new(&self.tools.git)
    }

    /// Whether `git status --porcelain <path>` reports anything
    pub async fn has_changes(&self, path: &str) -> Result<bool, ToolError> {
        let inv = self.command().args(["status", "--porcelain", path]);
        let out = self.runner.run_checked(&inv).await?;
        Ok(!out.stdout.trim().is_empty())
    }

    /// `git add <paths>`
    pub async fn add(&self, paths: &[&str]) -> Result<(), ToolError> {
        let inv = self.command().arg("add").args(paths.iter().copied());
        self.runner.run_checked(&inv).await.map(|_| ())
    }

    /// `git commit -m <message> --author=<author> -n`
    pub async fn commit(&self, message: &str, author: &str) -> Result<(), ToolError> {
        let inv = self
            .command()
            .args(["commit", "-m", message])
            .arg(format!("--author={}", author))
            .arg("-n");
        self.runner.run_checked(&inv).await.map(|_| ())
    }

    /// Restore paths in both index and working tree to HEAD
    pub async fn restore_from_head(&self, paths: &[&str]) -> Result<(), ToolError> {
        let inv = self
            .command()
            .args(["checkout", "HEAD", "--"])
            .args(paths.iter().copied());
        self.runner.run_checked(&inv).await.map(|_| ())
    }

    /// Return a directory to its committed state: untracked files are
    /// removed and tracked files restored from HEAD.
    pub async fn discard_directory(&self, path: &str) -> Result<(), ToolError> {
        let clean = self.command().args(["clean", "-fd", "--", path]);
        self.runner.run_checked(&clean).await?;
        if self.has_changes(path).await? {
            self.restore_from_head(&[path]).await?;
        }
        Ok(())
    }
}
