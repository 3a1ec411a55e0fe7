//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3 hashes
//! of file contents without buffering whole files, and the [`Fingerprint`]
//! built from a hash and a file extension. A fingerprint doubles as the name
//! of the link created for that content: `<64 hex chars><extension>`.
//!
//! BLAKE3 gives a 256-bit digest, which leaves accidental collisions out of
//! reach for any realistic file collection.
//!
//! # Example
//!
//! ```no_run
//! use picpac::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let fingerprint = hasher.fingerprint(Path::new("holiday.jpg")).unwrap();
//! println!("{}", fingerprint); // e.g. "af1349b9...262.jpg"
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::extension::{extension_of, validate_suffix};
use super::{FingerprintError, HashError};

/// Size of the read buffer fed into the hash accumulator.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A raw 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Render a digest as lowercase hexadecimal.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Content digest plus extension; also the link name in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Combine a digest with an extension (leading `.` included, or empty).
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::InvalidExtension`] when the extension
    /// contains a character that cannot appear in a file name.
    pub fn new(hash: &Hash, extension: &str) -> Result<Self, FingerprintError> {
        validate_suffix(extension)?;
        Ok(Self(format!("{}{}", hash_to_hex(hash), extension)))
    }

    /// The fingerprint as a file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digest part, without the extension.
    #[must_use]
    pub fn digest_hex(&self) -> &str {
        &self.0[..64]
    }

    /// The extension part, possibly empty.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.0[64..]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for Fingerprint {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// Streaming BLAKE3 hasher.
///
/// Reading holds no locks and writes nothing; a `Hasher` may be shared
/// between threads.
#[derive(Debug, Clone)]
pub struct Hasher {
    /// Size of each read
    chunk_size: usize,
    /// Optional shutdown flag checked between chunks
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            shutdown_flag: None,
        }
    }

    /// Use a different read size. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    /// Hash the whole content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened, a read fails
    /// partway through, or shutdown is requested while reading.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_reader(path, file)
    }

    /// Hash everything `reader` yields. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] on read failure or shutdown.
    pub fn hash_reader<R: Read>(&self, path: &Path, mut reader: R) -> Result<Hash, HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Fingerprint the file at `path`: content hash plus its own extension.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::UnreadableFile`] if the content cannot be
    /// read and [`FingerprintError::InvalidExtension`] if the extension
    /// cannot be part of a file name.
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        let extension = extension_of(path).unwrap_or_default();
        self.fingerprint_with_extension(path, &extension)
    }

    /// Fingerprint the file at `path` using an already known extension.
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::fingerprint`].
    pub fn fingerprint_with_extension(
        &self,
        path: &Path,
        extension: &str,
    ) -> Result<Fingerprint, FingerprintError> {
        validate_suffix(extension)?;
        let hash = self.full_hash(path)?;
        Fingerprint::new(&hash, extension)
    }
}
