//! Text output formatter for human-readable display
//!
//! This module provides:
//! - The lock file diff with semantic change kinds
//! - Outdated and security sections as reported by the tools
//! - The unsupported modules table
//! - A per-package summary

use crate::domain::{ChangeKind, PackageOutcome, UnsupportedModules, UpdateOutcome};
use crate::lockfile::{LockChange, LockDiff};
use crate::output::console::{header2, paint};
use crate::output::ReportFormatter;
use crate::report::{FullReport, ReportSection, RunReport, SectionBody};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter with color option
    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn kind_label(&self, kind: ChangeKind) -> String {
        if !self.color {
            return kind.label().to_string();
        }
        match kind {
            ChangeKind::Major => kind.label().red().bold().to_string(),
            ChangeKind::Minor => kind.label().yellow().to_string(),
            ChangeKind::Patch => kind.label().green().to_string(),
            ChangeKind::Unknown => kind.label().dimmed().to_string(),
        }
    }

    fn write_header(&self, title: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "{}", header2(title, self.color))?;
        writeln!(writer)
    }

    fn write_lock_diff(&self, diff: &LockDiff, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write_header("Lock File Changes", writer)?;
        if diff.is_empty() {
            writeln!(writer, "No packages changed")?;
            return writeln!(writer);
        }

        let width = diff
            .changed
            .iter()
            .chain(&diff.added)
            .chain(&diff.removed)
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0);

        for (label, changes) in [
            ("Changed", &diff.changed),
            ("Added", &diff.added),
            ("Removed", &diff.removed),
        ] {
            if changes.is_empty() {
                continue;
            }
            writeln!(writer, "{} ({}):", label, changes.len())?;
            for change in changes {
                self.write_lock_change(change, width, writer)?;
            }
        }
        writeln!(writer)
    }

    fn write_lock_change(
        &self,
        change: &LockChange,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let from = change.from.as_deref().unwrap_or("(none)");
        let to = change.to.as_deref().unwrap_or("(removed)");
        let dev = if change.dev {
            paint(" (dev)", self.color, |s| s.dimmed())
        } else {
            String::new()
        };

        match (&change.from, &change.to) {
            (Some(old), Some(new)) => writeln!(
                writer,
                "  {:<width$}  {} → {}  ({}){}",
                change.name,
                from,
                to,
                self.kind_label(ChangeKind::between(old, new)),
                dev,
                width = width
            ),
            _ => writeln!(
                writer,
                "  {:<width$}  {} → {}{}",
                change.name,
                from,
                to,
                dev,
                width = width
            ),
        }
    }

    fn write_section(
        &self,
        section: &ReportSection,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_header(&section.title, writer)?;
        match &section.body {
            SectionBody::Packages(packages) if packages.is_empty() => {
                writeln!(writer, "No packages found")?
            }
            SectionBody::Packages(packages) => {
                for package in packages {
                    writeln!(writer, "{}", package)?;
                }
            }
            SectionBody::Text(text) if text.trim().is_empty() => {
                writeln!(writer, "Nothing reported")?
            }
            SectionBody::Text(text) => writeln!(writer, "{}", text.trim_end())?,
        }
        writeln!(writer)
    }

    fn write_unsupported(
        &self,
        modules: &UnsupportedModules,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_header("Unsupported Modules", writer)?;
        if modules.is_empty() {
            writeln!(writer, "No obsolete modules found")?;
            return writeln!(writer);
        }

        let rows: Vec<[String; 4]> = modules
            .iter()
            .map(|m| {
                [
                    m.name.clone(),
                    m.current_version.clone(),
                    m.recommended_display().to_string(),
                    m.environments.join(", "),
                ]
            })
            .collect();
        let headings = ["Module", "Current version", "Recommended version", "Environments"];

        let mut widths = headings.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let heading = format!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {}",
            headings[0],
            headings[1],
            headings[2],
            headings[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
        writeln!(writer, "{}", paint(heading.trim_end(), self.color, |s| s.bold()))?;
        for row in &rows {
            writeln!(
                writer,
                "{:<w0$}  {:<w1$}  {:<w2$}  {}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
            )?;
        }
        writeln!(writer)
    }

    fn write_full_report(&self, full: &FullReport, writer: &mut dyn Write) -> std::io::Result<()> {
        for section in &full.sections {
            self.write_section(section, writer)?;
        }
        self.write_unsupported(&full.unsupported, writer)
    }

    fn write_outcome(
        &self,
        outcome: &PackageOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        match &outcome.outcome {
            UpdateOutcome::Updated {
                change: Some(change),
                extension,
                ..
            } => {
                let marker = if *extension { " [drupal]" } else { "" };
                writeln!(
                    writer,
                    "  {}: {} ({}){}",
                    outcome.package,
                    change,
                    self.kind_label(change.kind()),
                    marker
                )
            }
            _ => writeln!(writer, "  {}", outcome),
        }
    }

    fn write_summary(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write_header("Summary", writer)?;
        if report.outcomes.is_empty() {
            writeln!(writer, "No packages to update")?;
        }

        let groups: [(&str, Vec<&PackageOutcome>); 3] = [
            ("Updated", report.updated().collect()),
            ("Not updated", report.not_changed().collect()),
            ("Failed", report.failed().collect()),
        ];
        for (label, outcomes) in groups {
            if outcomes.is_empty() {
                continue;
            }
            let title = format!("{} ({}):", label, outcomes.len());
            let title = if label == "Failed" {
                paint(&title, self.color, |s| s.red())
            } else {
                title
            };
            writeln!(writer, "{}", title)?;
            for outcome in outcomes {
                self.write_outcome(outcome, writer)?;
            }
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "Finished at {} ({}s)",
            report.finished_at.format("%Y-%m-%d %H:%M:%S"),
            (report.finished_at - report.started_at).num_seconds()
        )
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        self.write_lock_diff(&report.lock_diff, writer)?;
        if let Some(full) = &report.full {
            self.write_full_report(full, writer)?;
        }
        self.write_summary(report, writer)
    }
}
