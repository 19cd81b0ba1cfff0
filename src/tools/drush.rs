//! Drush adapter
//!
//! Every site command is addressed to one alias: `drush <alias> <command>`.

use crate::config::ToolPaths;
use crate::domain::{filter_candidates, PackageName};
use crate::error::ToolError;
use crate::exec::{CommandOutput, CommandRunner, Invocation};
use std::path::Path;

/// Drush adapter
pub struct Drush<'a> {
    runner: &'a dyn CommandRunner,
    tools: &'a ToolPaths,
}

impl<'a> Drush<'a> {
    /// Create a new Drush adapter
    pub fn new(runner: &'a dyn CommandRunner, tools: &'a ToolPaths) -> Self {
        Self { runner, tools }
    }

    /// Run `drush <environment> <args>` and fail on a non-zero exit
    pub async fn run(&self, environment: &str, args: &[&str]) -> Result<CommandOutput, ToolError> {
        let inv = Invocation::new(&self.tools.drush)
            .arg(environment)
            .args(args.iter().copied());
        self.runner.run_checked(&inv).await
    }

    /// `drush <env> cr`
    pub async fn cache_rebuild(&self, environment: &str) -> Result<(), ToolError> {
        self.run(environment, &["cr"]).await.map(|_| ())
    }

    /// `drush <env> cim -y`
    pub async fn config_import(&self, environment: &str) -> Result<(), ToolError> {
        self.run(environment, &["cim", "-y"]).await.map(|_| ())
    }

    /// `drush <env> cex -y`
    pub async fn config_export(&self, environment: &str) -> Result<(), ToolError> {
        self.run(environment, &["cex", "-y"]).await.map(|_| ())
    }

    /// `drush <env> updb -y`
    pub async fn update_db(&self, environment: &str) -> Result<(), ToolError> {
        self.run(environment, &["updb", "-y"]).await.map(|_| ())
    }

    /// `drush <env> php:script <file>`, returning its stdout
    pub async fn php_script(&self, environment: &str, script: &Path) -> Result<String, ToolError> {
        let script = script.display().to_string();
        Ok(self.run(environment, &["php:script", &script]).await?.stdout)
    }

    /// Raw `drush pm:security --fields=name --format=list` against the local site
    pub async fn security_listing(&self) -> Result<CommandOutput, ToolError> {
        let inv = Invocation::new(&self.tools.drush).args([
            "pm:security",
            "--fields=name",
            "--format=list",
        ]);
        self.runner.run(&inv).await
    }

    /// Packages drupal.org has security advisories for
    pub async fn security_packages(&self) -> Result<Vec<PackageName>, ToolError> {
        let out = self.security_listing().await?.require()?;
        Ok(filter_candidates(out.stdout.lines()))
    }
}
