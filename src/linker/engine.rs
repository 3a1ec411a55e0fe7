//! Dedup-link engine.
//!
//! # Overview
//!
//! One run goes through four steps:
//! 1. **Traverse**: walk the source tree depth-first (see [`Walker`]),
//!    counting every regular file as examined
//! 2. **Filter**: keep files whose extension is in the [`ExtensionSet`]
//! 3. **Fingerprint & decide**: hash each candidate and create
//!    `destination/<fingerprint>` unless an entry with that name exists
//! 4. **Report**: return the [`RunResult`]
//!
//! Fingerprinting runs on a bounded thread pool. Link creation uses
//! [`create_exclusive`], so candidates sharing content can be processed
//! concurrently and still produce exactly one link. Which of them wins is
//! unspecified.
//!
//! # Example
//!
//! ```no_run
//! use picpac::linker::{LinkConfig, LinkEngine};
//! use picpac::scanner::ExtensionSet;
//! use std::path::Path;
//!
//! let engine = LinkEngine::new(LinkConfig::default());
//! let result = engine
//!     .run(Path::new("."), Path::new("/home/user/.picpac"), &ExtensionSet::default())
//!     .unwrap();
//! println!("Created {} symlinks", result.created);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::Level;
use rayon::prelude::*;

use super::symlink::{create_exclusive, LinkOutcome};
use super::{CandidateFailure, LinkError, RunResult};
use crate::progress::ProgressCallback;
use crate::scanner::{Candidate, ExtensionSet, Hasher, Walker, WalkerConfig};

/// Configuration for the link engine.
#[derive(Clone)]
pub struct LinkConfig {
    /// Number of threads fingerprinting candidates.
    /// `1` processes candidates strictly one after another.
    pub io_threads: usize,
    /// Abort on the first per-candidate failure or traversal error.
    pub strict: bool,
    /// Log each link and skipped duplicate at info instead of debug.
    pub verbose: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for LinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkConfig")
            .field("io_threads", &self.io_threads)
            .field("strict", &self.strict)
            .field("verbose", &self.verbose)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            strict: false,
            verbose: false,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl LinkConfig {
    /// Set the number of fingerprinting threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set fail-fast on any error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Log per-candidate outcomes at info level.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn outcome_level(&self) -> Level {
        if self.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

/// What happened to one candidate.
enum Outcome {
    Created { link: PathBuf, bytes: u64 },
    Duplicate { bytes: u64 },
    Failed(CandidateFailure),
    /// Not processed because the run is stopping.
    Skipped,
}

/// Engine that materializes one link per distinct fingerprint.
pub struct LinkEngine {
    config: LinkConfig,
    hasher: Hasher,
}

impl LinkEngine {
    /// Create a new engine with the given configuration.
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self { config, hasher }
    }

    /// Create a new engine with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LinkConfig::default())
    }

    /// Link every distinct candidate under `source` into `destination`.
    ///
    /// `destination` must already exist (see
    /// [`prepare_destination`](super::prepare_destination)).
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] if the extension set is invalid, the source is
    /// not a readable directory, the destination is not a directory, or (in
    /// strict mode) on the first failure. Per-candidate failures are
    /// otherwise reported in [`RunResult::failures`].
    pub fn run(
        &self,
        source: &Path,
        destination: &Path,
        extensions: &ExtensionSet,
    ) -> Result<RunResult, LinkError> {
        let start_time = Instant::now();

        extensions.validate()?;
        let source = validate_source(source)?;
        validate_destination(destination)?;

        if extensions.is_empty() {
            log::warn!("No extensions configured, nothing will be linked");
        }
        log::info!(
            "Linking {} files from {} into {}",
            extensions,
            source.display(),
            destination.display()
        );

        let mut result = RunResult::default();
        let candidates = self.collect_candidates(&source, extensions, &mut result)?;
        result.candidates = candidates.len();

        self.link_into(candidates, destination, &mut result)?;

        if self.config.is_shutdown_requested() {
            result.interrupted = true;
            log::info!("Run interrupted by shutdown signal");
        }
        result.duration = start_time.elapsed();

        log::info!("symlinks: {}", result.created);
        Ok(result)
    }

    /// Link an already collected list of candidates into `destination`.
    ///
    /// Only steps 3 and 4 run: `examined` equals the number of candidates.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] if the destination is not a directory, or in
    /// strict mode on the first failure.
    pub fn link_candidates(
        &self,
        candidates: Vec<Candidate>,
        destination: &Path,
    ) -> Result<RunResult, LinkError> {
        let start_time = Instant::now();
        validate_destination(destination)?;

        let mut result = RunResult {
            examined: candidates.len(),
            candidates: candidates.len(),
            ..Default::default()
        };
        self.link_into(candidates, destination, &mut result)?;

        result.interrupted = self.config.is_shutdown_requested();
        result.duration = start_time.elapsed();
        Ok(result)
    }

    /// Steps 1 and 2: walk and filter.
    fn collect_candidates(
        &self,
        source: &Path,
        extensions: &ExtensionSet,
        result: &mut RunResult,
    ) -> Result<Vec<Candidate>, LinkError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut walker = Walker::new(source, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut candidates = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(file) => {
                    result.examined += 1;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(result.examined, &file.path.to_string_lossy());
                    }
                    if let Some(candidate) = Candidate::from_entry(file, extensions) {
                        candidates.push(candidate);
                    }
                }
                Err(e) if self.config.strict => return Err(e.into()),
                Err(e) => result.scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        log::info!(
            "Examined {} files, {} candidates",
            result.examined,
            candidates.len()
        );
        Ok(candidates)
    }

    /// Steps 3 and 4: fingerprint, link, and fold outcomes into `result`.
    fn link_into(
        &self,
        candidates: Vec<Candidate>,
        destination: &Path,
        result: &mut RunResult,
    ) -> Result<(), LinkError> {
        if candidates.is_empty() {
            log::debug!("No candidates to link");
            return Ok(());
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("linking", candidates.len());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()?;

        // Set on the first failure in strict mode so the rest stop early.
        let abort = AtomicBool::new(false);
        let processed = AtomicUsize::new(0);

        let outcomes: Vec<Outcome> = pool.install(|| {
            candidates
                .into_par_iter()
                .map(|candidate| {
                    if abort.load(Ordering::SeqCst) || self.config.is_shutdown_requested() {
                        return Outcome::Skipped;
                    }
                    let outcome = self.process_candidate(&candidate, destination);
                    if self.config.strict && matches!(outcome, Outcome::Failed(_)) {
                        abort.store(true, Ordering::SeqCst);
                    }
                    if let Some(ref callback) = self.config.progress_callback {
                        let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                        callback.on_progress(current, &candidate.path.to_string_lossy());
                    }
                    outcome
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("linking");
        }

        for outcome in outcomes {
            match outcome {
                Outcome::Created { link, bytes } => {
                    result.created += 1;
                    result.bytes_hashed += bytes;
                    result.created_links.push(link);
                }
                Outcome::Duplicate { bytes } => {
                    result.duplicates += 1;
                    result.bytes_hashed += bytes;
                }
                Outcome::Failed(failure) if self.config.strict => return Err(failure.error),
                Outcome::Failed(failure) => result.failures.push(failure),
                Outcome::Skipped => {}
            }
        }

        Ok(())
    }

    /// Fingerprint one candidate and create its link if absent.
    fn process_candidate(&self, candidate: &Candidate, destination: &Path) -> Outcome {
        let target = match std::path::absolute(&candidate.path) {
            Ok(target) => target,
            Err(e) => {
                log::warn!("Cannot resolve {}: {}", candidate.path.display(), e);
                return Outcome::Failed(CandidateFailure {
                    path: candidate.path.clone(),
                    error: LinkError::TargetUnresolved {
                        path: candidate.path.clone(),
                        source: e,
                    },
                });
            }
        };

        let fingerprint = match self
            .hasher
            .fingerprint_with_extension(&target, &candidate.extension)
        {
            Ok(fp) => fp,
            Err(e) if e.is_interrupted() => return Outcome::Skipped,
            Err(e) => {
                log::warn!("Failed to fingerprint {}: {}", target.display(), e);
                return Outcome::Failed(CandidateFailure {
                    path: target.clone(),
                    error: LinkError::Fingerprint {
                        path: target,
                        source: e,
                    },
                });
            }
        };

        let link = destination.join(fingerprint.as_str());
        let level = self.config.outcome_level();
        match create_exclusive(&target, &link) {
            Ok(LinkOutcome::Created) => {
                log::log!(level, "added: {}", link.display());
                Outcome::Created {
                    link,
                    bytes: candidate.size,
                }
            }
            Ok(LinkOutcome::AlreadyExists) => {
                log::log!(level, "skipping duplicate: {}", target.display());
                Outcome::Duplicate {
                    bytes: candidate.size,
                }
            }
            Err(e) => {
                log::warn!(
                    "Failed to create link {} -> {}: {}",
                    link.display(),
                    target.display(),
                    e
                );
                Outcome::Failed(CandidateFailure {
                    path: target.clone(),
                    error: LinkError::LinkCreateFailed {
                        link,
                        target,
                        source: Arc::new(e),
                    },
                })
            }
        }
    }
}

/// Check the source is a readable directory and make it absolute.
fn validate_source(source: &Path) -> Result<PathBuf, LinkError> {
    let metadata = match fs::metadata(source) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LinkError::SourceNotFound(source.to_path_buf()));
        }
        Err(e) => {
            return Err(LinkError::SourceUnreadable {
                path: source.to_path_buf(),
                source: e,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(LinkError::SourceNotADirectory(source.to_path_buf()));
    }

    let unreadable = |e| LinkError::SourceUnreadable {
        path: source.to_path_buf(),
        source: e,
    };
    fs::read_dir(source).map_err(unreadable)?;
    fs::canonicalize(source).map_err(unreadable)
}

fn validate_destination(destination: &Path) -> Result<(), LinkError> {
    if destination.is_dir() {
        Ok(())
    } else {
        Err(LinkError::DestinationNotADirectory(destination.to_path_buf()))
    }
}
