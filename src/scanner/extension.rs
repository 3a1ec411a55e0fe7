//! Extension sets: which files become link candidates.
//!
//! Extensions are case-sensitive suffixes that include the leading `.`,
//! exactly as they appear at the end of a link name (`<digest>.jpg`).
//! A file's extension is the part of its name after the last `.`, so
//! `photo.tar.jpg` has extension `.jpg` and `.bashrc` has none.

use std::collections::BTreeSet;
use std::path::Path;

/// Separator every configured extension must start with.
pub const EXTENSION_SEPARATOR: char = '.';

/// Image extensions used when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".bmp", ".gif", ".tiff", ".exif", ".rif"];

/// Errors for extensions that cannot form a legal file name suffix.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// The extension does not start with `.`.
    #[error("Invalid extension '{0}': must start with '.'")]
    MissingSeparator(String),

    /// The extension is just `.`.
    #[error("Invalid extension '{0}': nothing after '.'")]
    Empty(String),

    /// The extension contains a character not allowed in file names.
    #[error("Invalid extension '{extension}': contains illegal character {character:?}")]
    IllegalCharacter {
        /// Offending extension
        extension: String,
        /// First illegal character found
        character: char,
    },

    /// The extension has a second `.`, so no file name would ever end with it.
    #[error("Invalid extension '{0}': only the last '.'-suffix of a name is matched")]
    MultipleSeparators(String),
}

/// Whether `c` may never appear inside a single file name.
fn is_illegal_name_char(c: char) -> bool {
    c == '\0' || c == '/' || c == '\\' || std::path::is_separator(c)
}

/// Check that `suffix` can be appended to a hex digest and still be one
/// file name. The empty suffix (file without extension) is accepted.
///
/// # Errors
///
/// Returns [`ExtensionError::IllegalCharacter`] for path separators or NUL.
pub fn validate_suffix(suffix: &str) -> Result<(), ExtensionError> {
    if let Some(character) = suffix.chars().find(|&c| is_illegal_name_char(c)) {
        return Err(ExtensionError::IllegalCharacter {
            extension: suffix.to_string(),
            character,
        });
    }
    Ok(())
}

/// Validate the shape of one configured extension.
///
/// # Errors
///
/// Returns an [`ExtensionError`] describing the first problem found.
///
/// # Example
///
/// ```
/// use picpac::scanner::extension::validate_extension;
///
/// assert!(validate_extension(".jpg").is_ok());
/// assert!(validate_extension("jpg").is_err());
/// assert!(validate_extension(".").is_err());
/// ```
pub fn validate_extension(extension: &str) -> Result<(), ExtensionError> {
    let Some(rest) = extension.strip_prefix(EXTENSION_SEPARATOR) else {
        return Err(ExtensionError::MissingSeparator(extension.to_string()));
    };
    if rest.is_empty() {
        return Err(ExtensionError::Empty(extension.to_string()));
    }
    validate_suffix(extension)?;
    if rest.contains(EXTENSION_SEPARATOR) {
        return Err(ExtensionError::MultipleSeparators(extension.to_string()));
    }
    Ok(())
}

/// Extension of `path` including the leading `.`, if it has one.
///
/// Non UTF-8 extensions yield `None`; they can never be configured.
#[must_use]
pub fn extension_of(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    Some(format!("{EXTENSION_SEPARATOR}{ext}"))
}

/// A validated, case-sensitive set of extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    /// Build a set, validating every member.
    ///
    /// # Errors
    ///
    /// Returns the error for the first invalid extension.
    pub fn new<I, S>(extensions: I) -> Result<Self, ExtensionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for ext in extensions {
            let ext = ext.into();
            validate_extension(&ext)?;
            set.insert(ext);
        }
        Ok(Self { extensions: set })
    }

    /// Re-check every member. Sets built with [`ExtensionSet::new`] always pass.
    ///
    /// # Errors
    ///
    /// Returns the error for the first invalid extension.
    pub fn validate(&self) -> Result<(), ExtensionError> {
        self.extensions
            .iter()
            .try_for_each(|ext| validate_extension(ext))
    }

    /// Whether `extension` (with its leading `.`) is in the set.
    #[must_use]
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Whether the file at `path` has an extension in the set.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.contains(&ext))
    }

    /// Number of extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether no extension is configured (nothing will be linked).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Iterate over the extensions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(" "))
    }
}
