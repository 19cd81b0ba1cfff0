//! Progress narration printed while the phases run
//!
//! Headers follow two levels: `// PHASE //` and `/// Title ///`.

use colored::{ColoredString, Colorize};
use std::io::{self, Write};

/// Width of the `!` rule around a failed update
const BANNER_WIDTH: usize = 51;

/// Render a level 1 header: the text uppercased between `//` marks
pub fn header1(text: &str, color: bool) -> String {
    paint(&format!("// {} //", text.to_uppercase()), color, |s| {
        s.cyan().bold()
    })
}

/// Render a level 2 header: the text between `///` marks
pub fn header2(text: &str, color: bool) -> String {
    paint(&format!("/// {} ///", text), color, |s| s.bold())
}

pub(crate) fn paint(
    text: &str,
    color: bool,
    style: impl FnOnce(&str) -> ColoredString,
) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Narration writer
///
/// In quiet mode only failures are written.
pub struct Console<'w> {
    out: &'w mut dyn Write,
    quiet: bool,
    color: bool,
}

impl<'w> Console<'w> {
    /// Create a console writing to `out`
    pub fn new(out: &'w mut dyn Write, quiet: bool) -> Self {
        Self {
            out,
            quiet,
            color: true,
        }
    }

    /// Enable or disable colors (builder pattern)
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Print a level 1 header followed by a blank line
    pub fn header1(&mut self, text: &str) -> io::Result<()> {
        let header = header1(text, self.color);
        self.say(&format!("{}\n", header))
    }

    /// Print a level 2 header followed by a blank line
    pub fn header2(&mut self, text: &str) -> io::Result<()> {
        let header = header2(text, self.color);
        self.say(&format!("{}\n", header))
    }

    /// Print one line of narration
    pub fn say(&mut self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.out, "{}", text)
    }

    /// Print an empty line
    pub fn blank(&mut self) -> io::Result<()> {
        self.say("")
    }

    /// Print the banner for a failed package update, even in quiet mode
    pub fn failure_banner(&mut self, error_output: &str) -> io::Result<()> {
        let rule = paint(&"!".repeat(BANNER_WIDTH), self.color, |s| s.red().bold());
        writeln!(self.out)?;
        writeln!(self.out, "{}", rule)?;
        let error_output = error_output.trim_end();
        if !error_output.is_empty() {
            writeln!(self.out, "{}", error_output)?;
        }
        writeln!(
            self.out,
            "{}",
            paint(
                "Updating package FAILED: recovering previous state.",
                self.color,
                |s| s.red()
            )
        )?;
        writeln!(self.out, "{}", rule)
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
