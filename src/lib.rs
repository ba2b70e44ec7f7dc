//! dupsift - staged duplicate file finder
//!
//! Finds groups of byte-identical files under one or more directories.
//! Files are bucketed by size, hard links are collapsed to one
//! representative, and the surviving candidates are confirmed with a cheap
//! partial fingerprint followed by a full BLAKE3 hash.
//!
//! # Library use
//!
//! ```no_run
//! use dupsift::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_ignore_empty(true));
//! let (results, summary) = finder.find_duplicates(&[PathBuf::from("/data")])?;
//!
//! for group in &results.groups {
//!     println!("{} bytes: {:?}", group.size, group.paths);
//! }
//! println!("{} errors", summary.error_count());
//! # Ok::<(), dupsift::duplicates::FinderError>(())
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::Cli;
use crate::config::{Config, OutputFormat};
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application, writing results to stdout.
///
/// # Errors
///
/// Returns an error for a malformed config, a missing or non-directory root,
/// an interrupted scan, or a failed write to stdout.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    run_app_with_output(cli, &mut handle)
}

/// Run the application, writing results to `out`.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with_output<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    if cli.print_config {
        out.write_all(config.to_toml()?.as_bytes())?;
        return Ok(ExitCode::Success);
    }

    let handler = signal::install_handler()?;

    let mut finder_config = config
        .finder_config()
        .with_shutdown_flag(handler.get_flag());
    if config.show_progress() {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (results, summary) = finder.find_duplicates(&cli.paths)?;

    log::info!(
        "Scanned {} files ({}) in {:.2?}: {} duplicate files in {} sets, {} errors",
        summary.total_files,
        summary.total_size_display(),
        summary.scan_duration,
        results.duplicates,
        results.group_count(),
        summary.error_count()
    );

    let exit_code = ExitCode::for_completed_scan(results.has_duplicates(), summary.error_count());

    match config.output {
        OutputFormat::Json => {
            JsonOutput::new(&results, &summary, exit_code).write_to(out, true)?;
        }
        OutputFormat::Text => {
            TextOutput::new(&results)
                .with_summary_only(config.summary_only)
                .write_to(out)?;
        }
    }
    out.flush()?;

    Ok(exit_code)
}
