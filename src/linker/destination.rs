//! Destination directory bootstrap.
//!
//! Runs before the engine: the destination is created if missing and must
//! end up a writable directory. The engine itself never creates it.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Errors while making the destination ready.
#[derive(thiserror::Error, Debug)]
pub enum DestinationError {
    /// The destination did not exist and could not be created.
    #[error("Cannot create {path}: {source}")]
    CreateFailed {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The destination exists but links cannot be written into it.
    #[error("Destination {path} is not writable: {source}")]
    Unwritable {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Something other than a directory is in the way.
    #[error("Destination exists and is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Create `path` (with parents) if absent and check it is writable.
///
/// Returns the canonical destination path.
///
/// # Errors
///
/// Returns a [`DestinationError`] if the directory cannot be made ready.
pub fn prepare_destination(path: &Path) -> Result<PathBuf, DestinationError> {
    match fs::metadata(path) {
        Ok(metadata) if !metadata.is_dir() => {
            return Err(DestinationError::NotADirectory(path.to_path_buf()));
        }
        Ok(_) => {}
        Err(_) => {
            log::info!("Creating destination {}", path.display());
            fs::create_dir_all(path).map_err(|source| DestinationError::CreateFailed {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    check_writable(path)?;

    fs::canonicalize(path).map_err(|source| DestinationError::Unwritable {
        path: path.to_path_buf(),
        source,
    })
}

/// Probe file names tried before giving up on stale leftovers.
const PROBE_ATTEMPTS: usize = 16;

fn probe_name(attempt: usize) -> String {
    format!(".picpac-probe-{}-{attempt}", std::process::id())
}

/// Probe writability by creating and removing a uniquely named file.
///
/// Probes left behind by an earlier crashed run are skipped, not reused.
fn check_writable(path: &Path) -> Result<(), DestinationError> {
    let unwritable = |source| DestinationError::Unwritable {
        path: path.to_path_buf(),
        source,
    };

    for attempt in 0..PROBE_ATTEMPTS {
        let probe = path.join(probe_name(attempt));
        match OpenOptions::new().write(true).create_new(true).open(&probe) {
            Ok(file) => {
                drop(file);
                return fs::remove_file(&probe).map_err(unwritable);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("Stale probe file {}", probe.display());
            }
            Err(e) => return Err(unwritable(e)),
        }
    }

    Err(unwritable(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "every probe file name is taken",
    )))
}
