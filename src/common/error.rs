//! Error types for the regression runner
//!
//! Every error is local to the test case that raised it. The suite runner
//! records it as a failed result and moves on to the next case.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the regression runner
#[derive(Error, Debug)]
pub enum Error {
    // === Fixture Errors ===
    #[error("Fixture file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Test root '{}' is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    // === Process Errors ===
    #[error("Failed to launch '{executable}': {reason}")]
    LaunchFailure { executable: String, reason: String },

    #[error("Interpreter did not finish within {secs} seconds and was killed")]
    Timeout { secs: f64 },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid suite manifest '{path}': {error}")]
    Manifest { path: String, error: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not found error for a fixture path
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound {
            path: path.to_path_buf(),
        }
    }

    /// Create a launch failure for an executable
    pub fn launch_failure(executable: &Path, reason: impl ToString) -> Self {
        Self::LaunchFailure {
            executable: executable.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Short machine-readable code used in JSON reports
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } | Error::RootNotDirectory(_) => "NOT_FOUND",
            Error::LaunchFailure { .. } => "LAUNCH_FAILURE",
            Error::Timeout { .. } => "TIMEOUT",
            Error::Config(_) | Error::ConfigParse(_) | Error::Manifest { .. } => "CONFIG",
            Error::Io(_) | Error::FileRead { .. } => "IO",
            Error::Json(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error comes from how the runner was configured rather
    /// than from a single test case
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::ConfigParse(_) | Error::Manifest { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_path() {
        let err = Error::not_found(Path::new("tests/add.expect"));
        assert_eq!(err.to_string(), "Fixture file not found: tests/add.expect");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_launch_failure_message() {
        let err = Error::launch_failure(Path::new("./mvm"), "No such file or directory");
        assert_eq!(
            err.to_string(),
            "Failed to launch './mvm': No such file or directory"
        );
        assert!(!err.is_usage());
    }
}
