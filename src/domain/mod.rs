//! Core domain models for drupal-updater
//!
//! This module contains the fundamental types used throughout the application:
//! - Package identifiers and candidate filtering
//! - Per-package update outcomes and version changes
//! - Unsupported module records merged across environments

mod outcome;
mod package;
mod unsupported;

pub use outcome::{ChangeKind, PackageOutcome, UpdateOutcome, VersionChange};
pub use package::{filter_candidates, PackageName};
pub use unsupported::{
    UnsupportedModule, UnsupportedModuleRow, UnsupportedModules, NO_RECOMMENDED_VERSION,
};
