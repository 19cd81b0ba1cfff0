//! JSON output formatter for machine processing
//!
//! The whole report is written as a single document so that stdout can be
//! piped into other tools while narration goes to stderr.

use crate::domain::{PackageOutcome, UnsupportedModules};
use crate::lockfile::LockDiff;
use crate::output::ReportFormatter;
use crate::report::{FullReport, ReportSection, RunReport, SectionBody};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
    environments: &'a [String],
    security_only: bool,
    summary: JsonSummary,
    packages: &'a [PackageOutcome],
    lock_diff: &'a LockDiff,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<JsonFullReport<'a>>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    updated: usize,
    not_changed: usize,
    failed: usize,
}

#[derive(Serialize)]
struct JsonFullReport<'a> {
    sections: Vec<JsonSection<'a>>,
    unsupported_modules: &'a UnsupportedModules,
}

/// A section carries either parsed packages or verbatim tool output
#[derive(Serialize)]
struct JsonSection<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    packages: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a str>,
}

impl<'a> From<&'a ReportSection> for JsonSection<'a> {
    fn from(section: &'a ReportSection) -> Self {
        match &section.body {
            SectionBody::Packages(packages) => JsonSection {
                title: &section.title,
                packages: Some(packages.iter().map(|p| p.as_str()).collect()),
                output: None,
            },
            SectionBody::Text(text) => JsonSection {
                title: &section.title,
                packages: None,
                output: Some(text.as_str()),
            },
        }
    }
}

impl<'a> From<&'a FullReport> for JsonFullReport<'a> {
    fn from(full: &'a FullReport) -> Self {
        JsonFullReport {
            sections: full.sections.iter().map(JsonSection::from).collect(),
            unsupported_modules: &full.unsupported,
        }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            started_at: report.started_at,
            finished_at: report.finished_at,
            environments: &report.environments,
            security_only: report.security_only,
            summary: JsonSummary {
                updated: report.updated().count(),
                not_changed: report.not_changed().count(),
                failed: report.failed().count(),
            },
            packages: &report.outcomes,
            lock_diff: &report.lock_diff,
            report: report.full.as_ref().map(JsonFullReport::from),
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
