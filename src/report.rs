//! Data gathered for the final report

use crate::domain::{PackageName, PackageOutcome, UnsupportedModuleRow, UnsupportedModules};
use crate::error::ReportError;
use crate::lockfile::LockDiff;
use chrono::{DateTime, Local};
use serde_json::Value;

/// PHP script run through `drush php:script` to list unsupported modules
pub const UNSUPPORTED_MODULES_SCRIPT: &str = include_str!("../assets/unsupported_modules.php");

/// Everything a run produced, ready to be rendered
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub environments: Vec<String>,
    pub security_only: bool,
    /// Per-package results, in candidate order
    pub outcomes: Vec<PackageOutcome>,
    /// Snapshot versus final composer.lock
    pub lock_diff: LockDiff,
    /// Outdated, security and unsupported sections; absent for explicit package lists
    pub full: Option<FullReport>,
}

impl RunReport {
    pub fn updated(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes.iter().filter(|o| o.is_updated())
    }

    pub fn not_changed(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes.iter().filter(|o| o.is_not_changed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }
}

/// Sections only printed when candidates were discovered
#[derive(Debug, Clone, Default)]
pub struct FullReport {
    pub sections: Vec<ReportSection>,
    pub unsupported: UnsupportedModules,
}

/// A titled report section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: String,
    pub body: SectionBody,
}

/// Content of a report section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    /// A parsed package list
    Packages(Vec<PackageName>),
    /// Tool output, verbatim
    Text(String),
}

impl ReportSection {
    pub fn packages(title: impl Into<String>, packages: Vec<PackageName>) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Packages(packages),
        }
    }

    pub fn text(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Text(text.into()),
        }
    }
}

/// Decode the unsupported modules script output of one environment.
///
/// Accepts a JSON list of rows or an object whose values are rows; empty
/// output counts as an empty list.
pub fn decode_unsupported_rows(
    environment: &str,
    output: &str,
) -> Result<Vec<UnsupportedModuleRow>, ReportError> {
    let invalid = |message: String| ReportError::InvalidUnsupportedModules {
        environment: environment.to_string(),
        message,
    };

    let output = output.trim();
    if output.is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(output).map_err(|e| invalid(e.to_string()))?;
    let rows = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, row)| row).collect(),
        other => return Err(invalid(format!("expected a list of modules, got {}", other))),
    };

    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| invalid(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_list() {
        let rows = decode_unsupported_rows(
            "@prod",
            r#"[{"project_name": "ctools",
                 "current_version": "8.x-3.7",
                 "recommended_version": "None"}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].project_name, "ctools");
        assert_eq!(rows[0].current_version, "8.x-3.7");
    }

    #[test]
    fn test_decode_keyed_object() {
        let rows = decode_unsupported_rows(
            "@prod",
            r#"{"ctools": {"project_name": "ctools",
                           "current_version": "8.x-3.7",
                           "recommended_version": "8.x-3.14"},
                "panels": {"project_name": "panels",
                           "current_version": "8.x-4.6",
                           "recommended_version": "None"}}"#,
        )
        .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.project_name.as_str()).collect();
        assert_eq!(names, vec!["ctools", "panels"]);
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_unsupported_rows("@self", "[]").unwrap().is_empty());
        assert!(decode_unsupported_rows("@self", "  \n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode_unsupported_rows("@stage", "PHP Fatal error: oops").unwrap_err();
        assert!(err.to_string().contains("@stage"));
    }

    #[test]
    fn test_decode_wrong_shape() {
        assert!(decode_unsupported_rows("@stage", "42").is_err());
        assert!(decode_unsupported_rows("@stage", r#"[{"name":"ctools"}]"#).is_err());
    }

    #[test]
    fn test_script_is_bundled() {
        assert!(UNSUPPORTED_MODULES_SCRIPT.starts_with("<?php"));
        assert!(UNSUPPORTED_MODULES_SCRIPT.contains("NOT_SUPPORTED"));
    }
}
