//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a source tree
//! and yielding every regular file it contains. Traversal is depth-first and
//! pre-order: a directory is visited before its contents, every directory
//! and regular file exactly once.
//!
//! # Symlinks
//!
//! By default symbolic links to directories are not descended. A symlink to
//! a regular file is yielded under the link's own path, and a dangling link
//! is yielded too so it fails later as an unreadable candidate. With
//! [`WalkerConfig::follow_symlinks`] set, directory links are descended as
//! well and a link pointing back at an ancestor is reported as
//! [`ScanError::Loop`].
//!
//! # Example
//!
//! ```no_run
//! use picpac::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Whether the entry is hidden. The root itself never is.
    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    }

    /// Walk the directory tree, yielding one [`FileEntry`] per regular file.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; an unreadable directory only loses its own subtree.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .into_iter()
            .filter_entry(move |entry| !(skip_hidden && Self::is_hidden(entry)))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    return false;
                }
                true
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(entry),
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Turn a walked entry into a file entry, if it is a regular file.
    fn process_entry(&self, entry: DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            log::debug!("directory: {}", entry.path().display());
            return None;
        }

        if file_type.is_symlink() {
            return Self::process_symlink(entry);
        }

        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", entry.path().display());
            return None;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => return Some(Err(self.handle_walk_error(e))),
        };

        Some(Ok(FileEntry::new(entry.into_path(), size)))
    }

    /// A symlink met while not following links.
    ///
    /// Links to regular files are yielded under their own path, so the link
    /// (not its target) becomes the candidate. Links to directories are never
    /// descended. A dangling link is yielded with size 0; reading it later
    /// fails for that candidate alone.
    fn process_symlink(entry: DirEntry) -> Option<Result<FileEntry, ScanError>> {
        match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => {
                Some(Ok(FileEntry::new(entry.into_path(), metadata.len())))
            }
            Ok(_) => {
                log::trace!("Skipping symlink to non-file: {}", entry.path().display());
                None
            }
            Err(e) => {
                log::debug!("Dangling symlink {}: {}", entry.path().display(), e);
                Some(Ok(FileEntry::new(entry.into_path(), 0)))
            }
        }
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if let Some(ancestor) = error.loop_ancestor() {
            log::warn!(
                "Symlink loop: {} points to {}",
                path.display(),
                ancestor.display()
            );
            return ScanError::Loop {
                ancestor: ancestor.to_path_buf(),
                path,
            };
        }

        let kind = error.io_error().map(std::io::Error::kind);
        match kind {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                let source = error
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk error"));
                ScanError::Io {
                    path,
                    source: Arc::new(source),
                }
            }
        }
    }
}
