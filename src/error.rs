//! Structured error handling and exit codes.

use serde::Serialize;

use crate::config::ConfigError;
use crate::resolve::ResolveError;

/// Exit codes for the recordlink binary.
///
/// - 0: Success (including runs that skipped some files)
/// - 1: General error (unexpected failure)
/// - 2: Configuration error (bad input path, unreadable root, invalid settings)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The run completed and the graph was written.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The run could not start because of its inputs.
    ConfigError = 2,
    /// The run was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RL000",
            Self::GeneralError => "RL001",
            Self::ConfigError => "RL002",
            Self::Interrupted => "RL130",
        }
    }

    /// Classify a top-level error.
    ///
    /// Looks through the `anyhow` chain for a [`ResolveError`] or
    /// [`ConfigError`]; anything else is a general error.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(resolve) = cause.downcast_ref::<ResolveError>() {
                return match resolve {
                    ResolveError::Interrupted => Self::Interrupted,
                    e if e.is_configuration_error() => Self::ConfigError,
                    _ => Self::GeneralError,
                };
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::ConfigError;
            }
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RL002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Stage of the run that failed
    pub stage: String,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            stage: failing_stage(err).to_string(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

fn failing_stage(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| {
            if let Some(resolve) = cause.downcast_ref::<ResolveError>() {
                Some(resolve.stage())
            } else if cause.downcast_ref::<ConfigError>().is_some() {
                Some("configuration")
            } else if cause
                .downcast_ref::<crate::output::json::JsonOutputError>()
                .is_some()
            {
                Some("export")
            } else {
                None
            }
        })
        .unwrap_or("unknown")
}
