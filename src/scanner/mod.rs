//! Scanner module for directory traversal and content fingerprinting.
//!
//! This module provides functionality for:
//! - Depth-first directory walking using walkdir
//! - Extension filtering (case-sensitive, `.`-prefixed suffixes)
//! - Content fingerprints with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`extension`]: Extension set validation and matching
//! - [`hasher`]: BLAKE3 file hashing (streaming) and fingerprints
//!
//! # Example
//!
//! ```no_run
//! use picpac::scanner::{ExtensionSet, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let extensions = ExtensionSet::new([".jpg", ".png"]).unwrap();
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) if extensions.matches(&file.path) => println!("{}", file.path.display()),
//!         Ok(_) => {}
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod extension;
pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};
use std::sync::Arc;

// Re-export main types
pub use extension::{extension_of, ExtensionError, ExtensionSet, DEFAULT_EXTENSIONS};
pub use hasher::{hash_to_hex, Fingerprint, Hash, Hasher, CHUNK_SIZE};
pub use walker::Walker;

/// A regular file (or a symlink to one) discovered during traversal.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// A file whose extension is in the configured set.
///
/// Candidates only live for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Extension including the leading `.`, e.g. `.jpg`
    pub extension: String,
    /// File size in bytes, as seen by the walker
    pub size: u64,
}

impl Candidate {
    /// Build a candidate from a walked file if its extension is in `extensions`.
    #[must_use]
    pub fn from_entry(entry: FileEntry, extensions: &ExtensionSet) -> Option<Self> {
        let extension = extension_of(&entry.path)?;
        if !extensions.contains(&extension) {
            return None;
        }
        Some(Self {
            path: entry.path,
            extension,
            size: entry.size,
        })
    }

    /// Directory containing the candidate.
    #[must_use]
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Base name of the candidate, lossily converted for display.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into symlinked directories during traversal.
    /// Symlink loops are then reported as scan errors.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Following symlinks led back to an ancestor directory.
    #[error("Symlink loop at {path} (points to ancestor {ancestor})")]
    Loop {
        /// Path of the looping entry
        path: PathBuf,
        /// Ancestor it resolves to
        ancestor: PathBuf,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Map an I/O error on `path` to the matching variant.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }
}

/// Errors produced while turning a file into a [`Fingerprint`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum FingerprintError {
    /// The file could not be opened or fully read.
    #[error("Unreadable file: {0}")]
    UnreadableFile(#[from] HashError),

    /// The extension would not form a legal file name suffix.
    #[error(transparent)]
    InvalidExtension(#[from] ExtensionError),
}

impl FingerprintError {
    /// Whether this failure came from a shutdown request rather than the file.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::UnreadableFile(HashError::Interrupted(_)))
    }
}
