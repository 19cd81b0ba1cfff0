//! Per-package update outcomes

use super::PackageName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl ChangeKind {
    /// Determine the change type between two versions.
    ///
    /// Composer reports tags such as `v6.4.1`, plain `10.2.3`, and legacy
    /// Drupal contrib versions such as `8.x-1.5`; the latter drop the core
    /// prefix before comparing.
    pub fn between(from: &str, to: &str) -> Self {
        match (parse_version(from), parse_version(to)) {
            (Some(old), Some(new)) => {
                if old.major != new.major {
                    ChangeKind::Major
                } else if old.minor != new.minor {
                    ChangeKind::Minor
                } else {
                    ChangeKind::Patch
                }
            }
            _ => ChangeKind::Unknown,
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Major => "major",
            ChangeKind::Minor => "minor",
            ChangeKind::Patch => "patch",
            ChangeKind::Unknown => "?",
        }
    }
}

fn parse_version(raw: &str) -> Option<semver::Version> {
    let v = raw.trim();
    let v = v.strip_prefix('v').unwrap_or(v);
    let v = match v.split_once(".x-") {
        Some((_core, rest)) => rest,
        None => v,
    };

    if let Ok(version) = semver::Version::parse(v) {
        return Some(version);
    }

    // Composer allows two-part and four-part numbers; keep the first three.
    let (numbers, _suffix) = v.split_once('-').unwrap_or((v, ""));
    let mut parts = numbers.split('.').map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some(semver::Version::new(major, minor, patch))
}

/// A version pair read from composer.lock before and after an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChange {
    /// Version before the update, absent when the package is new
    pub from: Option<String>,
    /// Version after the update, absent when the package was removed
    pub to: Option<String>,
}

impl VersionChange {
    /// Creates a new version change
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }

    /// Classifies the change
    pub fn kind(&self) -> ChangeKind {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => ChangeKind::between(from, to),
            _ => ChangeKind::Unknown,
        }
    }
}

impl fmt::Display for VersionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from.as_deref().unwrap_or("(none)");
        let to = self.to.as_deref().unwrap_or("(removed)");
        write!(f, "{} → {}", from, to)
    }
}

/// What happened to a single package in the update loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The lock file changed and the result was committed
    Updated {
        /// Version pair of the package itself, when it is in the lock file
        #[serde(skip_serializing_if = "Option::is_none")]
        change: Option<VersionChange>,
        /// Whether the package is a Drupal extension
        extension: bool,
        /// composer-lock-diff output, verbatim
        #[serde(skip_serializing_if = "Option::is_none")]
        diff: Option<String>,
    },
    /// composer succeeded but the lock file is byte-identical
    NotChanged,
    /// The update or a post-update hook failed and the lock files were reverted
    FailedAndReverted {
        /// The failing command's captured error output
        error: String,
    },
}

/// Outcome for one candidate package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOutcome {
    /// The package that was attempted
    pub package: PackageName,
    /// What happened
    #[serde(flatten)]
    pub outcome: UpdateOutcome,
}

impl PackageOutcome {
    /// Creates a new package outcome
    pub fn new(package: PackageName, outcome: UpdateOutcome) -> Self {
        Self { package, outcome }
    }

    /// Returns true if the package was updated and committed
    pub fn is_updated(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::Updated { .. })
    }

    /// Returns true if the package was left unchanged
    pub fn is_not_changed(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::NotChanged)
    }

    /// Returns true if the update failed and was reverted
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::FailedAndReverted { .. })
    }
}

impl fmt::Display for PackageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            UpdateOutcome::Updated {
                change: Some(change),
                ..
            } => write!(f, "{}: {}", self.package, change),
            UpdateOutcome::Updated { change: None, .. } => write!(f, "{}: updated", self.package),
            UpdateOutcome::NotChanged => write!(f, "{}: not updated", self.package),
            UpdateOutcome::FailedAndReverted { .. } => {
                write!(f, "{}: failed, previous state recovered", self.package)
            }
        }
    }
}
