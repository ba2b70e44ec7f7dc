//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     { "size": 1024, "paths": ["/path/to/a.txt", "/path/to/b.txt"] }
//!   ],
//!   "duplicates": 2,
//!   "redundant_data_size": 1024,
//!   "total_files": 100,
//!   "summary": {
//!     "total_size": 1048576,
//!     "ignored_entries": 3,
//!     "scan_errors": 0,
//!     "read_errors": 0,
//!     "...": "...",
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dupsift::duplicates::DuplicateFinder;
//! use dupsift::output::json::JsonOutput;
//! use dupsift::error::ExitCode;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (results, summary) = finder.find_duplicates(&[PathBuf::from(".")])?;
//!
//! let output = JsonOutput::new(&results, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, Results, ScanSummary, StageStats};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// File size in bytes
    pub size: u64,
    /// Member paths, as discovered, sorted
    pub paths: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            size: group.size,
            paths: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Fingerprint pass statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonStageStats {
    /// Records that entered the pass
    pub input_files: usize,
    /// Fingerprints computed
    pub hashed_files: usize,
    /// Files dropped after a read failure
    pub failed_files: usize,
    /// Bytes read
    pub bytes_read: u64,
    /// Files dropped as unique
    pub unique_dropped: usize,
    /// Groups of two or more
    pub matched_groups: usize,
}

impl From<&StageStats> for JsonStageStats {
    fn from(stats: &StageStats) -> Self {
        Self {
            input_files: stats.input_files,
            hashed_files: stats.hashed_files,
            failed_files: stats.failed_files,
            bytes_read: stats.bytes_read,
            unique_dropped: stats.unique_dropped,
            matched_groups: stats.matched_groups,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Entries produced by the walker
    pub total_entries: usize,
    /// Total size of regular files scanned
    pub total_size: u64,
    /// Symlinks and special files skipped
    pub ignored_entries: usize,
    /// Entries that couldn't be listed or stat'ed
    pub scan_errors: usize,
    /// Files dropped after a read failure
    pub read_errors: usize,
    /// Empty files seen
    pub empty_files: usize,
    /// Empty files left out
    pub empty_files_ignored: usize,
    /// Files with a unique size
    pub eliminated_by_size: usize,
    /// Hard links collapsed
    pub hardlinks_filtered: usize,
    /// Partial pass
    pub partial: JsonStageStats,
    /// Full pass
    pub full: JsonStageStats,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_entries: summary.total_entries,
            total_size: summary.total_size,
            ignored_entries: summary.ignored_entries,
            scan_errors: summary.scan_errors.len(),
            read_errors: summary.read_errors.len(),
            empty_files: summary.empty_files,
            empty_files_ignored: summary.empty_files_ignored,
            eliminated_by_size: summary.eliminated_by_size,
            hardlinks_filtered: summary.hardlinks_filtered,
            partial: JsonStageStats::from(&summary.partial),
            full: JsonStageStats::from(&summary.full),
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups
    pub groups: Vec<JsonDuplicateGroup>,
    /// Total members across all groups
    pub duplicates: usize,
    /// Sum of `size * (members - 1)`
    pub redundant_data_size: u64,
    /// Regular files scanned
    pub total_files: usize,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from results, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupsift::duplicates::{assemble, DuplicateGroup, ScanSummary};
    /// use dupsift::output::json::JsonOutput;
    /// use dupsift::error::ExitCode;
    /// use std::path::PathBuf;
    ///
    /// let group = DuplicateGroup::new(1024, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    /// let results = assemble(None, vec![group], 2);
    ///
    /// let output = JsonOutput::new(&results, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.groups.len(), 1);
    /// assert_eq!(output.redundant_data_size, 1024);
    /// ```
    #[must_use]
    pub fn new(results: &Results, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            groups: results.groups.iter().map(JsonDuplicateGroup::from).collect(),
            duplicates: results.duplicates,
            redundant_data_size: results.redundant_size,
            total_files: results.total_files,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
