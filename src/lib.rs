//! picpac - Picks and packs pics
//!
//! Recursively collects files with chosen extensions below a source
//! directory and creates one flat symlink per distinct content inside a
//! destination folder. Links are named `<blake3 hex><extension>`, so
//! re-running is idempotent and identical files are linked only once.

pub mod cli;
pub mod config;
pub mod error;
pub mod linker;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::linker::{prepare_destination, LinkConfig, LinkEngine};
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::{ExtensionSet, WalkerConfig};

/// Run the application with parsed CLI arguments.
///
/// # Errors
///
/// Returns an error when the run could not start or was aborted (bad
/// source, unusable destination, invalid extensions, strict-mode failure).
/// Per-file failures end in [`ExitCode::PartialSuccess`] instead.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let color = !cli.no_color && io::stdout().is_terminal();
    if !color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let extensions = ExtensionSet::new(&config.extensions)?;

    let source = match cli.source {
        Some(ref source) => source.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let destination = prepare_destination(config.destination()?)?;

    let handler = signal::install_handler()?;

    let mut link_config = LinkConfig::default()
        .with_io_threads(config.io_threads)
        .with_strict(config.strict)
        .with_verbose(cli.verbose > 0)
        .with_walker_config(WalkerConfig::new(
            config.follow_symlinks,
            config.skip_hidden,
        ))
        .with_shutdown_flag(handler.get_flag());

    let show_progress = !cli.quiet && !cli.no_progress && cli.output == OutputFormat::Text;
    if show_progress {
        link_config = link_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let engine = LinkEngine::new(link_config);
    let result = engine.run(&source, &destination, &extensions)?;

    let exit_code = if result.interrupted {
        ExitCode::Interrupted
    } else if result.is_partial() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    let mut stdout = io::stdout().lock();
    match cli.output {
        OutputFormat::Text => {
            if !cli.quiet {
                TextOutput::new(&result, color).write_to(&mut stdout)?;
            }
        }
        OutputFormat::Json => {
            JsonOutput::new(&source, &destination, &result, exit_code).write_to(&mut stdout)?;
        }
    }

    Ok(exit_code)
}
