//! Command-line interface definitions for dupsift.
//!
//! # Example
//!
//! ```bash
//! # List duplicate groups under two trees
//! dupsift ~/Photos /mnt/backup/Photos
//!
//! # Final count only, without partial triage
//! dupsift --summary --skip-partial ~/Downloads
//!
//! # JSON document for scripting
//! dupsift --json --no-empty ~/Downloads
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Find groups of byte-identical files.
///
/// Files are bucketed by size, hard links are collapsed, and candidates are
/// confirmed with a partial then a full BLAKE3 fingerprint.
#[derive(Debug, Parser)]
#[command(name = "dupsift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Do not list groups, print only the final count
    #[arg(short, long)]
    pub summary: bool,

    /// Print results as a JSON document
    #[arg(long)]
    pub json: bool,

    /// Skip partial fingerprinting and hash every candidate in full
    #[arg(long)]
    pub skip_partial: bool,

    /// Leave zero-length files out of the results
    #[arg(long)]
    pub no_empty: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = parse_thread_count)]
    pub io_threads: Option<usize>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH", env = "DUPSIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Directories to scan
    #[arg(value_name = "PATH", required_unless_present = "print_config")]
    pub paths: Vec<PathBuf>,
}

/// Parse a worker thread count (at least 1).
///
/// # Errors
///
/// Returns an error if the value is not a positive integer.
pub fn parse_thread_count(s: &str) -> Result<usize, String> {
    let count: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid thread count: '{s}'"))?;
    if count == 0 {
        return Err("Thread count must be at least 1".to_string());
    }
    Ok(count)
}
