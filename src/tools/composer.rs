//! Composer adapter
//!
//! Wraps the composer subcommands the workflow needs and parses their
//! plain-text output.

use crate::config::ToolPaths;
use crate::domain::{filter_candidates, PackageName};
use crate::error::ToolError;
use crate::exec::{CommandOutput, CommandRunner, Invocation};

/// Composer adapter
pub struct Composer<'a> {
    runner: &'a dyn CommandRunner,
    tools: &'a ToolPaths,
}

impl<'a> Composer<'a> {
    /// Create a new Composer adapter
    pub fn new(runner: &'a dyn CommandRunner, tools: &'a ToolPaths) -> Self {
        Self { runner, tools }
    }

    fn command(&self) -> Invocation {
        Invocation::new(&self.tools.composer)
    }

    /// Direct, locked requirements (`composer show --locked --direct --name-only`)
    pub async fn direct_packages(&self, no_dev: bool) -> Result<Vec<PackageName>, ToolError> {
        let inv = self
            .command()
            .args(["show", "--locked", "--direct", "--name-only"])
            .arg_if(no_dev, "--no-dev");
        let out = self.runner.run_checked(&inv).await?;
        Ok(filter_candidates(out.stdout.lines()))
    }

    /// Packages with known advisories according to `composer audit`.
    ///
    /// composer exits non-zero when advisories exist, so only a failure to
    /// run at all is an error.
    pub async fn audit_packages(&self, no_dev: bool) -> Result<Vec<PackageName>, ToolError> {
        let inv = self
            .command()
            .args(["audit", "--locked"])
            .arg_if(no_dev, "--no-dev")
            .args(["--format", "plain"]);
        let out = self.runner.run(&inv).await?;
        Ok(parse_audit_packages(&out.combined()))
    }

    /// `composer update <package> --with-dependencies`, returned unchecked
    pub async fn update(&self, package: &PackageName) -> Result<CommandOutput, ToolError> {
        let inv = self
            .command()
            .args(["update", package.as_str(), "--with-dependencies"]);
        self.runner.run(&inv).await
    }

    /// The package type reported by `composer show <package>`
    pub async fn package_type(&self, package: &PackageName) -> Result<String, ToolError> {
        let inv = self.command().args(["show", package.as_str()]);
        let out = self.runner.run_checked(&inv).await?;
        Ok(parse_package_type(&out.stdout).unwrap_or_default())
    }

    /// `composer show --locked --outdated [--direct]`
    pub async fn outdated(&self, direct_only: bool) -> Result<String, ToolError> {
        let inv = self
            .command()
            .args(["show", "--locked", "--outdated"])
            .arg_if(direct_only, "--direct");
        Ok(self.runner.run_checked(&inv).await?.stdout)
    }

    /// Full `composer audit --locked` report, whatever its exit status
    pub async fn audit_report(&self) -> Result<String, ToolError> {
        let inv = self.command().args(["audit", "--locked"]);
        Ok(self.runner.run(&inv).await?.combined())
    }

    /// composer-lock-diff of the working tree against HEAD.
    ///
    /// Returns `None` when the tool is missing, fails, or prints nothing.
    pub async fn lock_diff(&self) -> Option<String> {
        let inv = Invocation::new(&self.tools.composer_lock_diff);
        match self.runner.run_checked(&inv).await {
            Ok(out) if !out.stdout.trim().is_empty() => Some(out.stdout.trim_end().to_string()),
            Ok(_) => None,
            Err(e) => {
                log::warn!("composer-lock-diff unavailable: {}", e);
                None
            }
        }
    }
}

/// Extract package names from `composer audit --format plain` output.
///
/// Every `Package...: <name>` line contributes its second `:` field; the
/// result is sorted and de-duplicated.
pub fn parse_audit_packages(output: &str) -> Vec<PackageName> {
    let mut names: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Package"))
        .filter_map(|line| line.split(':').nth(1))
        .map(str::trim)
        .collect();
    names.sort_unstable();
    names.dedup();
    filter_candidates(names)
}

/// Extract the `type` value from `composer show <package>` output
pub fn parse_package_type(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.starts_with("type"))
        .find_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Drupal modules, themes, profiles and drush command packages need the
/// post-update hooks; `drupal-library` and non-Drupal packages do not.
pub fn is_drupal_extension(package_type: &str) -> bool {
    package_type.starts_with("drupal") && package_type != "drupal-library"
}
