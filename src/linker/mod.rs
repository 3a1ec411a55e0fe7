//! Content-addressed link materialization.
//!
//! This module turns a source tree into a flat directory of symbolic links,
//! one per distinct (content, extension) pair:
//!
//! - [`engine`]: the dedup-link engine ([`LinkEngine`])
//! - [`destination`]: preparing the destination directory before a run
//! - [`symlink`]: the exclusive "create if absent" link primitive
//!
//! Links are named after their [`Fingerprint`](crate::scanner::Fingerprint)
//! and point at the absolute path of the first file seen with that content.
//! Existing entries in the destination are never replaced or removed, which
//! makes runs idempotent.

pub mod destination;
pub mod engine;
pub mod symlink;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::scanner::{ExtensionError, FingerprintError, ScanError};

pub use destination::{prepare_destination, DestinationError};
pub use engine::{LinkConfig, LinkEngine};

/// Errors that can occur while linking.
///
/// Source, destination and extension errors are fatal and returned before
/// any traversal. Fingerprint and link creation errors concern a single
/// candidate and are collected in [`RunResult::failures`] unless strict mode
/// is on.
#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    /// The source path does not exist.
    #[error("Invalid source, path not found: {0}")]
    SourceNotFound(PathBuf),

    /// The source path is not a directory.
    #[error("Invalid source, not a directory: {0}")]
    SourceNotADirectory(PathBuf),

    /// The source directory exists but cannot be listed.
    #[error("Invalid source, cannot read {path}: {source}")]
    SourceUnreadable {
        /// Source root
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The destination is missing or not a directory.
    #[error("Destination is not a directory: {0}")]
    DestinationNotADirectory(PathBuf),

    /// A configured extension cannot be used as a file name suffix.
    #[error(transparent)]
    InvalidExtension(#[from] ExtensionError),

    /// A candidate could not be fingerprinted.
    #[error("Cannot fingerprint {path}: {source}")]
    Fingerprint {
        /// Candidate path
        path: PathBuf,
        /// Why fingerprinting failed
        #[source]
        source: FingerprintError,
    },

    /// The symbolic link for a candidate could not be created.
    #[error("Cannot create link {link} -> {target}: {source}")]
    LinkCreateFailed {
        /// Link path inside the destination
        link: PathBuf,
        /// Candidate the link would point at
        target: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A candidate path could not be made absolute, so no link target exists.
    #[error("Cannot resolve link target {path}: {source}")]
    TargetUnresolved {
        /// Candidate path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A traversal error, only fatal in strict mode.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The fingerprinting thread pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Category of a per-candidate failure, for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file could not be read completely.
    UnreadableFile,
    /// The extension cannot be part of a link name.
    InvalidExtension,
    /// The link could not be created.
    LinkCreateFailed,
}

/// A candidate that could not be linked.
#[derive(Debug)]
pub struct CandidateFailure {
    /// Candidate path
    pub path: PathBuf,
    /// What went wrong
    pub error: LinkError,
}

impl CandidateFailure {
    /// Classify the failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match &self.error {
            LinkError::Fingerprint {
                source: FingerprintError::InvalidExtension(_),
                ..
            }
            | LinkError::InvalidExtension(_) => FailureKind::InvalidExtension,
            LinkError::LinkCreateFailed { .. } | LinkError::TargetUnresolved { .. } => {
                FailureKind::LinkCreateFailed
            }
            _ => FailureKind::UnreadableFile,
        }
    }
}

/// Counters and outcomes of one run.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Every regular file visited, matching or not
    pub examined: usize,
    /// Files whose extension is in the configured set
    pub candidates: usize,
    /// Links newly created in this run
    pub created: usize,
    /// Candidates skipped because a link with their fingerprint existed
    pub duplicates: usize,
    /// Bytes read while fingerprinting
    pub bytes_hashed: u64,
    /// Paths of the links created in this run
    pub created_links: Vec<PathBuf>,
    /// Candidates that could not be fingerprinted or linked
    pub failures: Vec<CandidateFailure>,
    /// Non-fatal traversal errors
    pub scan_errors: Vec<ScanError>,
    /// Whether the run stopped early on a shutdown request
    pub interrupted: bool,
    /// Wall time of the run
    pub duration: Duration,
}

impl RunResult {
    /// Whether anything went wrong without aborting the run.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() || !self.scan_errors.is_empty()
    }

    /// Candidates that were neither linked, skipped, nor failed (interruption).
    #[must_use]
    pub fn unprocessed(&self) -> usize {
        self.candidates
            .saturating_sub(self.created + self.duplicates + self.failures.len())
    }
}
