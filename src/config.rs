//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML config file (platform config dir, or `--config PATH`)
//! 3. `PICPAC_*` environment variables (e.g. `PICPAC_IO_THREADS=8`)
//! 4. Command-line flags ([`Config::apply_cli`])
//!
//! ```toml
//! destination = "/home/user/.picpac"
//! extensions = [".jpg", ".png"]
//! io_threads = 8
//! follow_symlinks = false
//! ```

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::scanner::DEFAULT_EXTENSIONS;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PICPAC_";

/// Name of the destination directory under the home directory.
pub const DEFAULT_DESTINATION_NAME: &str = ".picpac";

/// Errors while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A layer could not be read or had the wrong shape.
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// No destination was configured and no home directory was found.
    #[error("No destination given and the home directory could not be determined")]
    NoDestination,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving the links. Defaults to `~/.picpac`.
    pub destination: Option<PathBuf>,
    /// Extensions that make a file a candidate.
    pub extensions: Vec<String>,
    /// Number of fingerprinting threads.
    pub io_threads: usize,
    /// Follow symbolic links inside the source tree.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Abort on the first per-file failure.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            io_threads: 4,
            follow_symlinks: false,
            skip_hidden: false,
            strict: false,
        }
    }
}

/// `~/.picpac`, if the home directory is known.
#[must_use]
pub fn default_destination() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(DEFAULT_DESTINATION_NAME))
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// `path` overrides the platform config file location. A missing file is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a layer is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.map(Path::to_path_buf).or_else(Self::config_path);

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            log::debug!("Loading config from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        figment.extract().map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    /// Apply command-line flags on top of the loaded layers.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref destination) = cli.destination {
            self.destination = Some(destination.clone());
        }
        if let Some(ref extensions) = cli.extensions {
            self.extensions.clone_from(extensions);
        }
        if let Some(io_threads) = cli.io_threads {
            self.io_threads = io_threads;
        }
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_hidden |= cli.skip_hidden;
        self.strict |= cli.strict;
    }

    /// The configured destination.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDestination`] if none is set.
    pub fn destination(&self) -> Result<&Path, ConfigError> {
        self.destination.as_deref().ok_or(ConfigError::NoDestination)
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "picpac", "picpac").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
