//! Spinner for long-running external commands
//!
//! composer and drush can take minutes; the spinner shows which command is
//! running and for how long. It draws on stderr and is cleared when dropped.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner tied to one running command
pub struct CommandSpinner {
    bar: Option<ProgressBar>,
}

impl CommandSpinner {
    /// Start a spinner labelled with `command`, or nothing when disabled
    pub fn start(enabled: bool, command: &str) -> Self {
        if !enabled {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        {
            bar.set_style(style);
        }
        bar.set_message(command.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }
}

impl Drop for CommandSpinner {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_spinner_draws_nothing() {
        let spinner = CommandSpinner::start(false, "composer update drupal/token");
        assert!(spinner.bar.is_none());
    }

    #[test]
    fn test_enabled_spinner() {
        let spinner = CommandSpinner::start(true, "drush @self cr");
        assert!(spinner.bar.is_some());
        drop(spinner);
    }
}
