//! Run configuration
//!
//! Settings are resolved once, in priority order:
//! 1. CLI options
//! 2. drupal-updater.toml (project root, or the file given with --config)
//! 3. Built-in defaults
//!
//! The result is a `RunContext` that is passed to every phase.

use crate::cli::UpdateArgs;
use crate::domain::PackageName;
use crate::error::ConfigError;
use crate::exec::DEFAULT_COMMAND_TIMEOUT;
use crate::lockfile::LOCK_FILE;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the project root
pub const CONFIG_FILE: &str = "drupal-updater.toml";

/// Drush alias of the local site
pub const DEFAULT_ENVIRONMENTS: &str = "@self";

/// Author used for every commit unless overridden
pub const DEFAULT_AUTHOR: &str = "Drupal <drupal@update-helper>";

/// How the two security advisory sources are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMerge {
    /// Packages reported by both composer audit and drush pm:security
    #[default]
    Intersect,
    /// Packages reported by either source
    Union,
}

impl SecurityMerge {
    /// Combine the composer audit list with the drupal.org advisory list.
    ///
    /// Audit order is kept; in union mode Drupal-only packages follow.
    pub fn combine(self, audit: Vec<PackageName>, drupal: Vec<PackageName>) -> Vec<PackageName> {
        match self {
            SecurityMerge::Intersect => audit.into_iter().filter(|p| drupal.contains(p)).collect(),
            SecurityMerge::Union => {
                let mut packages = audit;
                for package in drupal {
                    if !packages.contains(&package) {
                        packages.push(package);
                    }
                }
                packages
            }
        }
    }
}

/// External tool locations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPaths {
    pub composer: String,
    pub drush: String,
    pub git: String,
    pub composer_lock_diff: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            composer: "composer".to_string(),
            drush: "drush".to_string(),
            git: "git".to_string(),
            composer_lock_diff: "composer-lock-diff".to_string(),
        }
    }
}

impl ToolPaths {
    // Relative paths such as vendor/bin/drush are anchored at the project
    // root; bare program names are left for PATH lookup.
    fn anchored(mut self, project_dir: &Path) -> Self {
        for tool in [
            &mut self.composer,
            &mut self.drush,
            &mut self.git,
            &mut self.composer_lock_diff,
        ] {
            let path = Path::new(tool.as_str());
            if path.is_relative() && path.components().count() > 1 {
                *tool = project_dir.join(path).display().to_string();
            }
        }
        self
    }
}

/// Contents of drupal-updater.toml; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub environments: Option<Vec<String>>,
    pub author: Option<String>,
    pub security: Option<bool>,
    pub no_dev: Option<bool>,
    pub config_dir: Option<String>,
    pub docroot: Option<String>,
    /// Seconds
    pub command_timeout: Option<u64>,
    pub security_merge: Option<SecurityMerge>,
    pub tools: ToolPaths,
}

impl FileConfig {
    /// Parse config file content
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the config file.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>, project_dir: &Path) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (project_dir.join(CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Self::parse(&content, &path)
    }
}

/// Everything one run needs, resolved up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Project root holding composer.json and composer.lock
    pub project_dir: PathBuf,
    /// Drush aliases, ordered and de-duplicated
    pub environments: Vec<String>,
    /// Commit author override
    pub author: String,
    /// Only update packages with security advisories
    pub security_only: bool,
    /// Leave require-dev packages alone
    pub no_dev: bool,
    /// Explicit package list; `None` means discover and print the full report
    pub packages: Option<Vec<PackageName>>,
    /// How composer audit and drush pm:security are combined
    pub security_merge: SecurityMerge,
    /// Exported configuration directory, relative to the project root
    pub config_dir: String,
    /// Drupal docroot, relative to the project root
    pub docroot: String,
    /// External tool locations
    pub tools: ToolPaths,
    /// Ceiling applied to every external command
    pub command_timeout: Duration,
}

impl RunContext {
    /// Resolve CLI options against the config file and defaults
    pub fn resolve(args: &UpdateArgs) -> Result<Self, ConfigError> {
        let file = FileConfig::load(args.config.as_deref(), &args.path)?;
        Self::from_parts(args, file)
    }

    /// Merge already-loaded config with CLI options
    pub fn from_parts(args: &UpdateArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let environments = match (&args.environments, &file.environments) {
            (Some(cli), _) => parse_environments(cli),
            (None, Some(list)) => parse_environments(&list.join(",")),
            (None, None) => parse_environments(DEFAULT_ENVIRONMENTS),
        };
        if environments.is_empty() {
            return Err(ConfigError::NoEnvironments);
        }

        let command_timeout = match file.command_timeout {
            Some(0) => return Err(ConfigError::InvalidTimeout { value: 0 }),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_COMMAND_TIMEOUT,
        };

        let packages = args.packages.as_deref().map(parse_package_list);

        Ok(Self {
            project_dir: args.path.clone(),
            environments,
            author: args
                .author
                .clone()
                .or(file.author)
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            security_only: args.security || file.security.unwrap_or(false),
            no_dev: args.no_dev || file.no_dev.unwrap_or(false),
            packages,
            security_merge: file.security_merge.unwrap_or_default(),
            config_dir: file.config_dir.unwrap_or_else(|| "config".to_string()),
            docroot: file.docroot.unwrap_or_else(|| "web".to_string()),
            tools: file.tools.anchored(&args.path),
            command_timeout,
        })
    }

    /// Whether the report includes outdated, security and unsupported sections
    pub fn full_report(&self) -> bool {
        self.packages.is_none()
    }

    /// Fail early when the project has nothing to update
    pub fn check_project(&self) -> Result<(), ConfigError> {
        if self.project_dir.join(LOCK_FILE).is_file() {
            Ok(())
        } else {
            Err(ConfigError::MissingLockFile {
                path: self.project_dir.clone(),
            })
        }
    }
}

/// Split a comma separated alias list, dropping blanks and repeats
pub fn parse_environments(raw: &str) -> Vec<String> {
    let mut environments: Vec<String> = Vec::new();
    for env in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if !environments.iter().any(|e| e == env) {
            environments.push(env.to_string());
        }
    }
    environments
}

/// Split an explicit package list; invalid names are dropped with a warning
pub fn parse_package_list(raw: &str) -> Vec<PackageName> {
    let mut packages: Vec<PackageName> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match PackageName::parse(item) {
            Some(package) if !packages.contains(&package) => packages.push(package),
            Some(_) => {}
            None => log::warn!("ignoring '{}': not a vendor/name package", item),
        }
    }
    packages
}
