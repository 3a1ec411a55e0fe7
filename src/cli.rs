//! Command-line interface definitions for picpac.
//!
//! This module defines all CLI arguments using the clap derive API. Values
//! not given on the command line fall back to the config file and
//! environment (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Link all images below the current directory into ~/.picpac
//! picpac
//!
//! # Pick PNG and GIF files from ~/Downloads into a slideshow folder
//! picpac -s ~/Downloads -d ~/slideshow -e .png .gif
//!
//! # Verbose mode for debugging
//! picpac -v -s ~/Pictures
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::scanner::extension::validate_extension;

/// Picks and packs pics.
///
/// picpac recursively collects files below the source directory and creates
/// flat symlinks to them inside a destination folder. Files are deduplicated
/// by content, not by name, so it is handy to keep playlists or slideshows
/// up to date.
#[derive(Debug, Parser)]
#[command(name = "picpac")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source folder to scan (default: current directory)
    #[arg(short, long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Destination folder for the links (default: ~/.picpac)
    #[arg(short, long, value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Valid file extensions, e.g. .jpg (default: common image formats)
    ///
    /// Extensions are case-sensitive and must start with '.'.
    #[arg(short, long, value_name = "EXT", num_args = 0.., value_parser = parse_extension)]
    pub extensions: Option<Vec<String>>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Number of threads used to fingerprint files (default: 4)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub io_threads: Option<usize>,

    /// Descend into symlinked directories inside the source tree
    ///
    /// Symlink loops are detected and reported, not followed.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Abort on the first file that cannot be read or linked
    #[arg(long)]
    pub strict: bool,

    /// Output format for the run summary
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not show progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Validate one `--extensions` value.
///
/// # Errors
///
/// Returns the validation message if the extension is malformed.
///
/// # Examples
///
/// ```
/// use picpac::cli::parse_extension;
///
/// assert_eq!(parse_extension(".jpg").unwrap(), ".jpg");
/// assert!(parse_extension("jpg").is_err());
/// ```
pub fn parse_extension(s: &str) -> Result<String, String> {
    validate_extension(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}
