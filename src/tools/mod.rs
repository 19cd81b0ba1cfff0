//! Adapters for the external tools the workflow drives
//!
//! This module provides:
//! - Composer: package listing, audit, update, type lookup, lock diff
//! - Drush: per-alias site commands and the security advisory listing
//! - Git: change detection, staging, commits and file restore

mod composer;
mod drush;
mod git;

pub use composer::{is_drupal_extension, parse_audit_packages, parse_package_type, Composer};
pub use drush::Drush;
pub use git::Git;
