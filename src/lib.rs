//! drupal-updater - Drupal site maintenance library
//!
//! Drives composer, drush and git to:
//! - Consolidate exported configuration on every environment
//! - Update composer packages one at a time, reverting failures
//! - Commit each successful update separately
//! - Report lock file changes, pending updates, advisories and
//!   unsupported modules

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod exec;
pub mod lockfile;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod report;
pub mod tools;
