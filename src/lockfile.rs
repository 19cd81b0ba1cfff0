//! composer.lock reading, snapshotting and diffing
//!
//! This module provides:
//! - A minimal serde model of composer.lock (name, version, type per package)
//! - The run-long snapshot used to compute the before/after report
//! - A structured diff between two lock files

use crate::error::{IoError, LockFileError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Lock file written by composer
pub const LOCK_FILE: &str = "composer.lock";

/// Manifest committed next to the lock file
pub const MANIFEST_FILE: &str = "composer.json";

/// Copy of composer.lock taken before the first update
pub const SNAPSHOT_FILE: &str = "composer.drupalupdater.lock";

/// A locked package entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    #[serde(rename = "type", default)]
    pub package_type: String,
}

/// The parts of composer.lock this tool reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ComposerLock {
    #[serde(default)]
    pub packages: Vec<LockedPackage>,
    #[serde(rename = "packages-dev", default)]
    pub packages_dev: Vec<LockedPackage>,
}

impl ComposerLock {
    /// Parses lock file content
    pub fn parse(content: &str, path: &Path) -> Result<Self, LockFileError> {
        serde_json::from_str(content).map_err(|e| LockFileError::parse(path, e.to_string()))
    }

    /// Reads and parses a lock file
    pub fn read(path: &Path) -> Result<Self, LockFileError> {
        let content = fs::read_to_string(path).map_err(|e| LockFileError::read(path, e))?;
        Self::parse(&content, path)
    }

    /// Returns the locked version of a package, searching both sections
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.packages
            .iter()
            .chain(self.packages_dev.iter())
            .find(|p| p.name == name)
            .map(|p| p.version.as_str())
    }

    fn index(&self) -> BTreeMap<&str, (&str, bool)> {
        let mut index = BTreeMap::new();
        for p in &self.packages {
            index.insert(p.name.as_str(), (p.version.as_str(), false));
        }
        for p in &self.packages_dev {
            index.insert(p.name.as_str(), (p.version.as_str(), true));
        }
        index
    }
}

/// Reads raw lock file bytes, used for the byte-identical change check
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, LockFileError> {
    fs::read(path).map_err(|e| LockFileError::read(path, e))
}

/// One row of a lock diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockChange {
    /// Package name
    pub name: String,
    /// Version before, absent for added packages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Version after, absent for removed packages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Whether the package is locked as a dev requirement
    pub dev: bool,
}

/// Differences between two lock files, each list sorted by package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LockDiff {
    pub changed: Vec<LockChange>,
    pub added: Vec<LockChange>,
    pub removed: Vec<LockChange>,
}

impl LockDiff {
    /// Computes the diff from `before` to `after`
    pub fn between(before: &ComposerLock, after: &ComposerLock) -> Self {
        let old = before.index();
        let new = after.index();
        let mut diff = LockDiff::default();

        for (name, (to, dev)) in &new {
            match old.get(name) {
                Some((from, _)) if from == to => {}
                Some((from, _)) => diff.changed.push(LockChange {
                    name: name.to_string(),
                    from: Some(from.to_string()),
                    to: Some(to.to_string()),
                    dev: *dev,
                }),
                None => diff.added.push(LockChange {
                    name: name.to_string(),
                    from: None,
                    to: Some(to.to_string()),
                    dev: *dev,
                }),
            }
        }

        for (name, (from, dev)) in &old {
            if !new.contains_key(name) {
                diff.removed.push(LockChange {
                    name: name.to_string(),
                    from: Some(from.to_string()),
                    to: None,
                    dev: *dev,
                });
            }
        }

        diff
    }

    /// Returns true when both lock files resolve the same versions
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

/// The pre-run copy of composer.lock.
///
/// `remove` deletes it and reports failures; if the run aborts first, the
/// copy is removed on drop and errors are ignored.
#[derive(Debug)]
pub struct LockSnapshot {
    path: PathBuf,
    removed: bool,
}

impl LockSnapshot {
    /// Copies `<project>/composer.lock` to `<project>/composer.drupalupdater.lock`
    pub fn create(project_dir: &Path) -> Result<Self, IoError> {
        let from = project_dir.join(LOCK_FILE);
        let to = project_dir.join(SNAPSHOT_FILE);
        fs::copy(&from, &to).map_err(|source| IoError::Snapshot {
            from,
            to: to.clone(),
            source,
        })?;
        Ok(Self {
            path: to,
            removed: false,
        })
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses the snapshot
    pub fn read(&self) -> Result<ComposerLock, LockFileError> {
        ComposerLock::read(&self.path)
    }

    /// Deletes the snapshot
    pub fn remove(mut self) -> Result<(), IoError> {
        self.removed = true;
        fs::remove_file(&self.path).map_err(|e| IoError::generic(&self.path, e))
    }
}

impl Drop for LockSnapshot {
    fn drop(&mut self) {
        if !self.removed {
            let _ = fs::remove_file(&self.path);
        }
    }
}
