//! Exclusive symbolic link creation.
//!
//! Creating a symlink fails with [`ErrorKind::AlreadyExists`] when any entry
//! (file, directory, or link, dangling or not) already has that name. The
//! engine relies on this as its "create if absent" step: there is no window
//! between checking for a link and creating it, so concurrent candidates with
//! the same fingerprint still produce a single link.

use std::io::{self, ErrorKind};
use std::path::Path;

/// Outcome of [`create_exclusive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was created.
    Created,
    /// An entry with that name already existed and was left untouched.
    AlreadyExists,
}

/// Create `link` pointing at `target` unless an entry named `link` exists.
///
/// # Errors
///
/// Returns the I/O error for any failure other than an existing entry,
/// including [`ErrorKind::Unsupported`] on platforms without symlinks.
pub fn create_exclusive(target: &Path, link: &Path) -> io::Result<LinkOutcome> {
    match platform_symlink(target, link) {
        Ok(()) => Ok(LinkOutcome::Created),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(LinkOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn platform_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn platform_symlink(target: &Path, link: &Path) -> io::Result<()> {
    // Needs Developer Mode or the symlink privilege.
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn platform_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
