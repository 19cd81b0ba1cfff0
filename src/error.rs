//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ToolError: An external command (composer, drush, git) failed
//! - ConfigError: Issues with CLI options or the configuration file
//! - LockFileError: composer.lock could not be read or parsed
//! - ReportError: Output of a reporting collaborator could not be decoded
//! - IoError: File system operation failures
//!
//! `AppError` wraps all of them, plus failures to write to the terminal.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// External command related errors
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Lock file related errors
    #[error(transparent)]
    LockFile(#[from] LockFileError),

    /// Report decoding errors
    #[error(transparent)]
    Report(#[from] ReportError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),

    /// Writing narration or the report failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors raised by external commands
#[derive(Error, Debug)]
pub enum ToolError {
    /// The command ran and exited with a non-zero status
    #[error("command `{command}` failed{}:\n{stderr}", exit_suffix(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The command could not be started at all
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exceeded the per-command ceiling and was killed
    #[error("command `{command}` timed out after {}s", .limit.as_secs())]
    Timeout { command: String, limit: Duration },
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => String::new(),
    }
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML or has unknown keys
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// No environment survived parsing
    #[error("no environments given: expected a comma separated list of drush aliases")]
    NoEnvironments,

    /// Timeout must be a positive number of seconds
    #[error("invalid command timeout '{value}': expected a positive number of seconds")]
    InvalidTimeout { value: u64 },

    /// The project directory has no composer.lock
    #[error("composer.lock not found in {path}: run from a composer project root or pass --path")]
    MissingLockFile { path: PathBuf },
}

/// Errors related to composer.lock handling
#[derive(Error, Debug)]
pub enum LockFileError {
    /// Failed to read lock file
    #[error("failed to read lock file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Lock file is not valid JSON
    #[error("failed to parse lock file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Errors related to report collaborators
#[derive(Error, Debug)]
pub enum ReportError {
    /// The unsupported modules script printed something other than JSON
    #[error("invalid unsupported modules report from {environment}: {message}")]
    InvalidUnsupportedModules {
        environment: String,
        message: String,
    },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Failed to create the lock file snapshot
    #[error("failed to snapshot {from} to {to}: {source}")]
    Snapshot {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error at {path}: {source}")]
    Generic {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Creates a new Failed error
    pub fn failed(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        ToolError::Failed {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Captured error stream of the failing command, if any
    pub fn error_output(&self) -> String {
        match self {
            ToolError::Failed { stderr, .. } => stderr.clone(),
            other => other.to_string(),
        }
    }
}

impl LockFileError {
    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LockFileError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LockFileError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl IoError {
    /// Creates a new Generic IO error
    pub fn generic(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::Generic {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_failed_with_code() {
        let err = ToolError::failed(
            "composer update drupal/token",
            Some(2),
            "Your requirements could not be resolved",
        );
        let msg = format!("{}", err);
        assert!(msg.contains("command `composer update drupal/token` failed with exit code 2"));
        assert!(msg.contains("could not be resolved"));
    }

    #[test]
    fn test_tool_error_failed_without_code() {
        let err = ToolError::failed("drush @self cr", None, "");
        let msg = format!("{}", err);
        assert!(msg.contains("`drush @self cr` failed"));
        assert!(!msg.contains("exit code"));
    }

    #[test]
    fn test_tool_error_timeout() {
        let err = ToolError::Timeout {
            command: "composer update".to_string(),
            limit: Duration::from_secs(300),
        };
        assert!(err.to_string().contains("timed out after 300s"));
    }

    #[test]
    fn test_error_output_prefers_stderr() {
        let err = ToolError::failed("git commit", Some(1), "nothing to commit");
        assert_eq!(err.error_output(), "nothing to commit");

        let err = ToolError::Timeout {
            command: "git commit".to_string(),
            limit: Duration::from_secs(5),
        };
        assert!(err.error_output().contains("timed out"));
    }

    #[test]
    fn test_config_error_no_environments() {
        let msg = ConfigError::NoEnvironments.to_string();
        assert!(msg.contains("no environments"));
    }

    #[test]
    fn test_config_error_missing_lock_file() {
        let err = ConfigError::MissingLockFile {
            path: PathBuf::from("/srv/site"),
        };
        assert!(err.to_string().contains("composer.lock not found in /srv/site"));
    }

    #[test]
    fn test_lock_file_error_parse() {
        let err = LockFileError::parse("composer.lock", "expected value at line 1");
        let msg = err.to_string();
        assert!(msg.contains("failed to parse lock file"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_app_error_from_tool_error() {
        let app_err: AppError = ToolError::failed("git add config", Some(128), "fatal").into();
        assert!(app_err.to_string().contains("git add config"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::InvalidTimeout { value: 0 }.into();
        assert!(app_err.to_string().contains("invalid command timeout"));
    }

    #[test]
    fn test_app_error_from_report_error() {
        let app_err: AppError = ReportError::InvalidUnsupportedModules {
            environment: "@prod".to_string(),
            message: "expected value".to_string(),
        }
        .into();
        assert!(app_err.to_string().contains("@prod"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = IoError::generic("/tmp/x", std::io::Error::other("boom"));
        let debug = format!("{:?}", err);
        assert!(debug.contains("Generic"));
    }
}
