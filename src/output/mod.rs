//! Output formatting
//!
//! This module provides:
//! - Console narration for the running phases
//! - Text output for the final report
//! - JSON output for machine processing

mod console;
mod json;
mod text;

pub use console::{header1, header2, Console};
pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::cli::Format;
use crate::report::RunReport;
use std::io::Write;

/// Trait for report formatters
pub trait ReportFormatter {
    /// Format and write the final report
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create a report formatter for the selected format
pub fn create_formatter(format: Format, color: bool) -> Box<dyn ReportFormatter> {
    match format {
        Format::Text => Box::new(TextFormatter::with_color(color)),
        Format::Json => Box::new(JsonFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockfile::LockDiff;
    use chrono::Local;

    fn empty_report() -> RunReport {
        let now = Local::now();
        RunReport {
            started_at: now,
            finished_at: now,
            environments: vec!["@self".to_string()],
            security_only: false,
            outcomes: Vec::new(),
            lock_diff: LockDiff::default(),
            full: None,
        }
    }

    #[test]
    fn test_create_text_formatter() {
        let mut buf = Vec::new();
        create_formatter(Format::Text, false)
            .format(&empty_report(), &mut buf)
            .unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("/// Lock File Changes ///"));
    }

    #[test]
    fn test_create_json_formatter() {
        let mut buf = Vec::new();
        create_formatter(Format::Json, false)
            .format(&empty_report(), &mut buf)
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["environments"][0], "@self");
    }
}
