//! JSON output formatter for run results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "source": "/home/user/Pictures",
//!   "destination": "/home/user/.picpac",
//!   "created_links": ["/home/user/.picpac/af13...262.jpg"],
//!   "failures": [
//!     { "path": "/home/user/Pictures/locked.jpg", "kind": "unreadable_file", "message": "..." }
//!   ],
//!   "summary": {
//!     "examined": 1204,
//!     "candidates": 312,
//!     "created": 294,
//!     "duplicates": 17,
//!     "failed": 1,
//!     "scan_errors": 0,
//!     "bytes_hashed": 50593792,
//!     "duration_ms": 1234,
//!     "interrupted": false,
//!     "exit_code": 3,
//!     "exit_code_name": "PP003"
//!   }
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::ExitCode;
use crate::linker::{FailureKind, RunResult};

/// One candidate that could not be linked.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    /// Candidate path
    pub path: String,
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable error message
    pub message: String,
}

/// Summary counters in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Every regular file visited
    pub examined: usize,
    /// Files with a configured extension
    pub candidates: usize,
    /// Links created in this run
    pub created: usize,
    /// Candidates whose fingerprint was already linked
    pub duplicates: usize,
    /// Candidates that could not be fingerprinted or linked
    pub failed: usize,
    /// Entries the walker could not read
    pub scan_errors: usize,
    /// Bytes read while fingerprinting
    pub bytes_hashed: u64,
    /// Duration of the run in milliseconds
    pub duration_ms: u64,
    /// Whether the run was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "PP000")
    pub exit_code_name: String,
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Source root that was scanned
    pub source: String,
    /// Destination directory
    pub destination: String,
    /// Links created in this run
    pub created_links: Vec<String>,
    /// Per-candidate failures
    pub failures: Vec<JsonFailure>,
    /// Summary counters
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the report for a finished run.
    #[must_use]
    pub fn new(source: &Path, destination: &Path, result: &RunResult, exit_code: ExitCode) -> Self {
        Self {
            source: source.display().to_string(),
            destination: destination.display().to_string(),
            created_links: result
                .created_links
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            failures: result
                .failures
                .iter()
                .map(|f| JsonFailure {
                    path: f.path.display().to_string(),
                    kind: f.kind(),
                    message: f.error.to_string(),
                })
                .collect(),
            summary: JsonSummary {
                examined: result.examined,
                candidates: result.candidates,
                created: result.created,
                duplicates: result.duplicates,
                failed: result.failures.len(),
                scan_errors: result.scan_errors.len(),
                bytes_hashed: result.bytes_hashed,
                duration_ms: u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
                interrupted: result.interrupted,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}
