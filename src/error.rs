//! Structured error handling and exit codes.

use serde::Serialize;

use crate::linker::{DestinationError, LinkError};
use crate::scanner::ExtensionError;

/// Exit codes for the picpac application.
///
/// - 0: Success (run completed, links may or may not have been created)
/// - 1: General error (unexpected failure, destination not usable)
/// - 2: Invalid input (bad source directory or extension)
/// - 3: Partial success (completed, but some files could not be linked)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed without failures.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Invalid input: the source or extensions were rejected before the run.
    InvalidInput = 2,
    /// Partial success: the run completed with some per-file failures.
    PartialSuccess = 3,
    /// Interrupted: the run was interrupted by user (Ctrl+C).
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
            Self::Success => "PP000",
            Self::GeneralError => "PP001",
            Self::InvalidInput => "PP002",
            Self::PartialSuccess => "PP003",
            Self::Interrupted => "PP130",
        }
    }

    /// Pick the exit code for an error that aborted the run.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<ExtensionError>().is_some() {
            return Self::InvalidInput;
        }
        if err.downcast_ref::<DestinationError>().is_some() {
            return Self::GeneralError;
        }
        match err.downcast_ref::<LinkError>() {
            Some(
                LinkError::SourceNotFound(_)
                | LinkError::SourceNotADirectory(_)
                | LinkError::SourceUnreadable { .. }
                | LinkError::InvalidExtension(_),
            ) => Self::InvalidInput,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "PP001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
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
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
