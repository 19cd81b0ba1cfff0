//! CLI argument parsing module for drupal-updater

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const UPDATE_HELP: &str = "Update composer packages.

Update includes:
  - Commit current configuration not exported (Drupal 8+).
  - Identify updatable composer packages (outdated).
  - For each package try to update and commit it (recovers previous state if it fails).
  - Report what changed and what is still outdated.";

/// Drupal maintenance helper
#[derive(Parser, Debug, Clone)]
#[command(
    name = "drupal-updater",
    version,
    about = "Update composer packages of a Drupal site one by one"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Consolidate configuration, update packages and report
    #[command(long_about = UPDATE_HELP)]
    Update(UpdateArgs),
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable text
    #[default]
    Text,
    /// A single JSON document on stdout
    Json,
}

/// Options of the `update` subcommand
#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Project root holding composer.json and composer.lock
    #[arg(short = 'C', long, default_value = ".")]
    pub path: PathBuf,

    /// Comma separated list of drush aliases to update [default: @self]
    #[arg(long, visible_alias = "envs", value_name = "ALIASES")]
    pub environments: Option<String>,

    /// Git author of every commit [default: "Drupal <drupal@update-helper>"]
    #[arg(short, long)]
    pub author: Option<String>,

    /// Only update packages with security advisories
    #[arg(short, long)]
    pub security: bool,

    /// Only update main requirements
    #[arg(long)]
    pub no_dev: bool,

    /// Comma separated list of packages to update; skips discovery and the full report
    #[arg(long, value_name = "PACKAGES")]
    pub packages: Option<String>,

    /// Configuration file [default: <path>/drupal-updater.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Log every external command
    #[arg(long)]
    pub verbose: bool,

    /// Only print errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
