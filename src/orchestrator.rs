//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: snapshot → consolidate → select → update → report
//! - Per-package recovery: a failed update is reverted and the batch continues
//! - Full report gathering when candidates were discovered
//!
//! Every external command is awaited before the next one starts.

use crate::config::RunContext;
use crate::domain::{
    filter_candidates, PackageName, PackageOutcome, UnsupportedModules, UpdateOutcome,
    VersionChange,
};
use crate::error::{AppError, IoError, LockFileError, ToolError};
use crate::exec::{CommandOutput, CommandRunner};
use crate::lockfile::{read_bytes, ComposerLock, LockDiff, LockSnapshot, LOCK_FILE, MANIFEST_FILE};
use crate::output::{Console, ReportFormatter};
use crate::report::{
    decode_unsupported_rows, FullReport, ReportSection, RunReport, UNSUPPORTED_MODULES_SCRIPT,
};
use crate::tools::{is_drupal_extension, Composer, Drush, Git};
use chrono::Local;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator<'a> {
    /// Resolved settings for this run
    ctx: &'a RunContext,
    /// Runs every external command
    runner: &'a dyn CommandRunner,
    /// Phase narration
    console: Console<'a>,
}

impl<'a> Orchestrator<'a> {
    /// Create a new orchestrator
    pub fn new(ctx: &'a RunContext, runner: &'a dyn CommandRunner, console: Console<'a>) -> Self {
        Self {
            ctx,
            runner,
            console,
        }
    }

    fn composer(&self) -> Composer<'a> {
        let ctx = self.ctx;
        Composer::new(self.runner, &ctx.tools)
    }

    fn drush(&self) -> Drush<'a> {
        let ctx = self.ctx;
        Drush::new(self.runner, &ctx.tools)
    }

    fn git(&self) -> Git<'a> {
        let ctx = self.ctx;
        Git::new(self.runner, &ctx.tools)
    }

    /// Run the four phases, write the report with `formatter`, and remove
    /// the lock file snapshot.
    pub async fn run(
        &mut self,
        formatter: &dyn ReportFormatter,
        out: &mut dyn Write,
    ) -> Result<RunReport, AppError> {
        let started_at = Local::now();
        self.ctx.check_project()?;
        let snapshot = LockSnapshot::create(&self.ctx.project_dir)?;
        log::debug!("lock file snapshot at {}", snapshot.path().display());

        self.print_summary()?;

        self.console.header1("1. Consolidating configuration")?;
        self.consolidate_configuration().await?;
        self.console.blank()?;

        self.console.header1("2. Checking packages")?;
        let candidates = self.check_packages().await?;
        self.console.blank()?;

        self.console.header1("3. Updating packages")?;
        let outcomes = self.update_packages(&candidates).await?;
        self.console.blank()?;

        self.console.header1("4. Report")?;
        self.console.flush()?;
        let lock_diff = self.lock_diff(&snapshot)?;
        let full = if self.ctx.full_report() {
            Some(self.full_report().await?)
        } else {
            None
        };

        let report = RunReport {
            started_at,
            finished_at: Local::now(),
            environments: self.ctx.environments.clone(),
            security_only: self.ctx.security_only,
            outcomes,
            lock_diff,
            full,
        };
        formatter.format(&report, out)?;
        out.flush()?;

        snapshot.remove()?;
        Ok(report)
    }

    fn print_summary(&mut self) -> std::io::Result<()> {
        let ctx = self.ctx;
        self.console.header1("Summary")?;
        for step in [
            "1. Consolidating configuration",
            "2. Checking packages",
            "3. Updating packages",
            "4. Report",
        ] {
            self.console.say(step)?;
        }
        self.console.blank()?;

        self.console
            .say(&format!("Environments: {}", ctx.environments.join(", ")))?;
        self.console.say(&format!("Author: {}", ctx.author))?;
        let selection = match &ctx.packages {
            Some(packages) => format!(
                "given list ({})",
                packages
                    .iter()
                    .map(PackageName::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None if ctx.security_only => "security advisories only".to_string(),
            None => "all direct packages".to_string(),
        };
        self.console.say(&format!("Packages: {}", selection))?;
        if ctx.no_dev {
            self.console.say("Development requirements are left alone")?;
        }
        self.console.blank()
    }

    /// Phase 1: import and re-export configuration on every environment,
    /// committing whatever the export changed.
    async fn consolidate_configuration(&mut self) -> Result<(), AppError> {
        let ctx = self.ctx;
        let drush = self.drush();
        let git = self.git();

        for env in &ctx.environments {
            self.console
                .say(&format!("Consolidating {} environment", env))?;
            drush.cache_rebuild(env).await?;
            drush.config_import(env).await?;
            drush.config_export(env).await?;

            if git.has_changes(&ctx.config_dir).await? {
                git.add(&[ctx.config_dir.as_str()]).await?;
                git.commit(
                    &format!("CONFIG - Consolidate current configuration on {}", env),
                    &ctx.author,
                )
                .await?;
                self.console
                    .say(&format!("Configuration of {} committed", env))?;
            } else {
                self.console.say("No changes to commit")?;
            }
        }

        // Start every environment from the committed configuration.
        for env in &ctx.environments {
            drush.cache_rebuild(env).await?;
            drush.config_import(env).await?;
        }
        Ok(())
    }

    /// Phase 2: the ordered candidate list
    async fn check_packages(&mut self) -> Result<Vec<PackageName>, AppError> {
        let ctx = self.ctx;
        let candidates = match &ctx.packages {
            Some(packages) => {
                self.console.say("Using the given package list")?;
                packages.clone()
            }
            None if ctx.security_only => self.security_candidates().await?,
            None => self.composer().direct_packages(ctx.no_dev).await?,
        };

        if candidates.is_empty() {
            self.console.say("No packages to update")?;
        }
        for package in &candidates {
            self.console.say(package.as_str())?;
        }
        Ok(candidates)
    }

    async fn security_candidates(&self) -> Result<Vec<PackageName>, ToolError> {
        let audit = self.composer().audit_packages(self.ctx.no_dev).await?;
        let drupal = match self.drush().security_packages().await {
            Ok(packages) => packages,
            Err(e) => {
                log::warn!("drush pm:security failed, Drupal advisories ignored: {}", e);
                Vec::new()
            }
        };
        log::debug!(
            "{} packagist and {} drupal.org advisories",
            audit.len(),
            drupal.len()
        );
        Ok(self.ctx.security_merge.combine(audit, drupal))
    }

    /// Phase 3: update candidates in order
    async fn update_packages(
        &mut self,
        candidates: &[PackageName],
    ) -> Result<Vec<PackageOutcome>, AppError> {
        let mut outcomes = Vec::with_capacity(candidates.len());
        for package in candidates {
            let outcome = self.update_package(package).await?;
            outcomes.push(PackageOutcome::new(package.clone(), outcome));
        }
        Ok(outcomes)
    }

    async fn update_package(&mut self, package: &PackageName) -> Result<UpdateOutcome, AppError> {
        let ctx = self.ctx;
        let composer = self.composer();
        let git = self.git();
        let lock_path = ctx.project_dir.join(LOCK_FILE);

        self.console.header2(&format!("Updating: {}", package))?;

        let before = read_bytes(&lock_path)?;
        if let Some(error) = failure_output(composer.update(package).await) {
            return self.revert(error, false).await;
        }

        let after = read_bytes(&lock_path)?;
        if after == before {
            self.console
                .say(&format!("Package {} has not been updated", package))?;
            return Ok(UpdateOutcome::NotChanged);
        }

        let extension = is_drupal_extension(&composer.package_type(package).await?);
        if extension {
            self.console
                .say("Drupal extension: applying database updates on every environment")?;
            if let Err(e) = self.run_extension_hooks().await {
                return self.revert(e.error_output(), true).await;
            }
        }

        let diff = composer.lock_diff().await;
        self.console.blank()?;
        self.console.say("Updated packages:")?;
        if let Some(diff) = &diff {
            self.console.say(diff)?;
        }

        let mut paths = vec![MANIFEST_FILE, LOCK_FILE];
        if extension {
            paths.push(ctx.docroot.as_str());
            paths.push(ctx.config_dir.as_str());
        }
        git.add(&paths).await?;
        let message = match &diff {
            Some(diff) => format!("UPDATE - {}\n\n{}", package, diff),
            None => format!("UPDATE - {}", package),
        };
        git.commit(&message, &ctx.author).await?;

        let change = version_change(package, &before, &after, &lock_path)?;
        Ok(UpdateOutcome::Updated {
            change,
            extension,
            diff,
        })
    }

    async fn run_extension_hooks(&self) -> Result<(), ToolError> {
        let drush = self.drush();
        for env in &self.ctx.environments {
            drush.cache_rebuild(env).await?;
            drush.update_db(env).await?;
            drush.config_export(env).await?;
        }
        Ok(())
    }

    /// Restore composer.json and composer.lock, plus the configuration
    /// directory once hooks may have exported into it. A failing restore is
    /// fatal.
    async fn revert(&mut self, error: String, exported: bool) -> Result<UpdateOutcome, AppError> {
        self.console.failure_banner(&error)?;
        let git = self.git();
        git.restore_from_head(&[MANIFEST_FILE, LOCK_FILE]).await?;
        if exported {
            git.discard_directory(&self.ctx.config_dir).await?;
        }
        Ok(UpdateOutcome::FailedAndReverted { error })
    }

    fn lock_diff(&self, snapshot: &LockSnapshot) -> Result<LockDiff, LockFileError> {
        let before = snapshot.read()?;
        let after = ComposerLock::read(&self.ctx.project_dir.join(LOCK_FILE))?;
        Ok(LockDiff::between(&before, &after))
    }

    /// Phase 4: sections printed only when candidates were discovered
    async fn full_report(&self) -> Result<FullReport, AppError> {
        let ctx = self.ctx;
        let composer = self.composer();
        let mut sections = Vec::new();

        if ctx.security_only {
            sections.push(ReportSection::packages(
                "Not Updated Securities (Packagist)",
                composer.audit_packages(ctx.no_dev).await?,
            ));
            sections.push(self.drupal_security_section().await);
        } else {
            sections.push(ReportSection::text(
                "Not Updated Packages (Direct)",
                composer.outdated(true).await?,
            ));
            sections.push(ReportSection::text(
                "Not Updated Packages (ALL)",
                composer.outdated(false).await?,
            ));
            sections.push(ReportSection::text(
                "Not Updated Securities (ALL)",
                composer.audit_report().await?,
            ));
            sections.push(self.drupal_security_section().await);
        }

        let unsupported = self.unsupported_modules().await?;
        Ok(FullReport {
            sections,
            unsupported,
        })
    }

    // A failing listing shows its error output in place of the packages.
    async fn drupal_security_section(&self) -> ReportSection {
        const TITLE: &str = "Not Updated Securities (Drupal)";
        match self.drush().security_listing().await {
            Ok(out) if out.success => {
                ReportSection::packages(TITLE, filter_candidates(out.stdout.lines()))
            }
            Ok(out) => ReportSection::text(TITLE, out.stderr),
            Err(e) => ReportSection::text(TITLE, e.to_string()),
        }
    }

    async fn unsupported_modules(&self) -> Result<UnsupportedModules, AppError> {
        let script = write_script()?;
        let drush = self.drush();
        let mut modules = UnsupportedModules::new();

        for env in &self.ctx.environments {
            let output = drush.php_script(env, script.path()).await?;
            let rows = decode_unsupported_rows(env, &output)?;
            log::debug!("{} reported {} unsupported modules", env, rows.len());
            modules.merge(env, rows);
        }
        Ok(modules)
    }
}

/// Error output of a failed update, or `None` when it succeeded.
///
/// Commands that could not start or timed out count as failed updates.
fn failure_output(result: Result<CommandOutput, ToolError>) -> Option<String> {
    match result {
        Ok(out) if out.success => None,
        Ok(out) if out.stderr.trim().is_empty() => Some(out.combined()),
        Ok(out) => Some(out.stderr),
        Err(e) => Some(e.to_string()),
    }
}

/// The package's own version pair, read from the lock file bytes
fn version_change(
    package: &PackageName,
    before: &[u8],
    after: &[u8],
    path: &Path,
) -> Result<Option<VersionChange>, LockFileError> {
    let before = ComposerLock::parse(&String::from_utf8_lossy(before), path)?;
    let after = ComposerLock::parse(&String::from_utf8_lossy(after), path)?;
    let from = before.version_of(package.as_str()).map(str::to_string);
    let to = after.version_of(package.as_str()).map(str::to_string);
    if from.is_none() && to.is_none() {
        Ok(None)
    } else {
        Ok(Some(VersionChange::new(from, to)))
    }
}

fn write_script() -> Result<NamedTempFile, IoError> {
    let mut file = tempfile::Builder::new()
        .prefix("unsupported-modules-")
        .suffix(".php")
        .tempfile()
        .map_err(|e| IoError::generic(std::env::temp_dir(), e))?;
    let path = file.path().to_path_buf();
    file.write_all(UNSUPPORTED_MODULES_SCRIPT.as_bytes())
        .map_err(|e| IoError::generic(path.clone(), e))?;
    file.flush().map_err(|e| IoError::generic(path, e))?;
    Ok(file)
}
