//! Duplicate finder implementation with staged fingerprinting.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - Collect entries from every root (see [`crate::scanner::walker`])
//! 2. **Size grouping** - Bucket by size, capture or drop empty files, prune
//!    unique sizes and filter hard links (see [`crate::duplicates::groups`])
//! 3. **Partial pass** - For buckets of at least [`MIN_PARTIAL_SIZE`] bytes,
//!    hash the first and last [`PARTIAL_WINDOW`] bytes and regroup
//! 4. **Full pass** - Hash the entire content of small-file buckets and of
//!    every partial candidate set, and keep groups of two or more
//! 5. **Assembly** - Sort groups and compute totals
//!
//! A partial match is only ever a reason to read the whole file; it never
//! makes a group on its own.
//!
//! Each pass builds one work list across all candidate sets, sorted by
//! device/inode (then path) for disk locality, and hashes it on a bounded
//! rayon pool. Workers only compute digests; the coordinating thread attaches
//! them to records once the pass is over.
//!
//! [`PARTIAL_WINDOW`]: crate::scanner::PARTIAL_WINDOW
//!
//! # Example
//!
//! ```no_run
//! use dupsift::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (results, summary) = finder.find_duplicates(&[PathBuf::from(".")])?;
//!
//! println!("{} duplicate files in {} sets", results.duplicates, results.group_count());
//! println!("{} files hashed in full", summary.full.hashed_files);
//! # Ok::<(), dupsift::duplicates::FinderError>(())
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{assemble, path_order, DuplicateGroup, FileRecord, Results, SizeClassifier};
use crate::progress::ProgressCallback;
use crate::scanner::{
    hash_to_hex, platform_capability, FileEntry, FingerprintKind, Hash, HashError, Hasher,
    InodeCapability, ScanError, Walker, WalkerConfig, MIN_PARTIAL_SIZE, PARTIAL_WINDOW,
};

/// Configuration for the duplicate finder.
///
/// Controls the behavior of the staged duplicate detection pipeline.
#[derive(Clone)]
pub struct FinderConfig {
    /// Go straight to full hashing for every bucket.
    pub skip_partial: bool,
    /// Leave zero-length files out of the results.
    pub ignore_empty: bool,
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Source of device/inode identity.
    pub capability: Arc<dyn InodeCapability>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("skip_partial", &self.skip_partial)
            .field("ignore_empty", &self.ignore_empty)
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("capability", &self.capability)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            skip_partial: false,
            ignore_empty: false,
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            capability: platform_capability(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Disable the partial fingerprint stage.
    #[must_use]
    pub fn with_skip_partial(mut self, skip: bool) -> Self {
        self.skip_partial = skip;
        self
    }

    /// Exclude zero-length files from the results.
    #[must_use]
    pub fn with_ignore_empty(mut self, ignore: bool) -> Self {
        self.ignore_empty = ignore;
        self
    }

    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Replace the inode capability.
    #[must_use]
    pub fn with_capability(mut self, capability: Arc<dyn InodeCapability>) -> Self {
        self.capability = capability;
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

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from one fingerprint pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Records that entered the pass
    pub input_files: usize,
    /// Fingerprints computed
    pub hashed_files: usize,
    /// Fingerprints already present and reused
    pub reused_files: usize,
    /// Files dropped because they couldn't be read
    pub failed_files: usize,
    /// Bytes read from disk
    pub bytes_read: u64,
    /// Files dropped because no other file shared their fingerprint
    pub unique_dropped: usize,
    /// Groups of two or more sharing a fingerprint
    pub matched_groups: usize,
    /// Files in those groups
    pub matched_files: usize,
}

impl StageStats {
    /// Percentage of input files eliminated by this pass.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            let eliminated = self.input_files - self.matched_files;
            (eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Entries produced by the walker
    pub total_entries: usize,
    /// Regular files considered
    pub total_files: usize,
    /// Total size of all regular files in bytes
    pub total_size: u64,
    /// Symlinks and special files skipped
    pub ignored_entries: usize,
    /// Empty files seen
    pub empty_files: usize,
    /// Empty files left out because they are ignored
    pub empty_files_ignored: usize,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files removed as hard links of another file
    pub hardlinks_filtered: usize,
    /// Partial pass statistics
    pub partial: StageStats,
    /// Full pass statistics
    pub full: StageStats,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of files in duplicate groups
    pub duplicate_files: usize,
    /// Sum of `size * (members - 1)` over groups
    pub redundant_size: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Traversal errors (entries skipped)
    pub scan_errors: Vec<ScanError>,
    /// Read errors (files dropped from their candidate group)
    pub read_errors: Vec<HashError>,
}

impl ScanSummary {
    /// Total non-fatal errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.scan_errors.len() + self.read_errors.len()
    }

    /// Format redundant size as human-readable string.
    #[must_use]
    pub fn redundant_display(&self) -> String {
        bytesize::ByteSize::b(self.redundant_size).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The hashing thread pool couldn't be created.
    #[error("Failed to create I/O thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An I/O error occurred during scanning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A candidate set: records of one size that may share content.
type CandidateSet = Vec<FileRecord>;

/// Position of a record inside the candidate sets of a pass.
#[derive(Debug, Clone, Copy)]
struct WorkItem {
    set: usize,
    record: usize,
}

/// Duplicate finder that owns the working set of one run.
///
/// # Example
///
/// ```no_run
/// use dupsift::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::PathBuf;
///
/// let config = FinderConfig::default().with_ignore_empty(true);
/// let finder = DuplicateFinder::new(config);
///
/// match finder.find_duplicates(&[PathBuf::from("/some/path")]) {
///     Ok((results, summary)) => {
///         println!("Found {} duplicate groups", results.group_count());
///         println!("Redundant: {}", summary.redundant_display());
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under the given roots.
    ///
    /// Traversal errors are counted in the summary and never abort the run.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - A root does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal
    /// - The hashing thread pool can't be created
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Results, ScanSummary), FinderError> {
        let start_time = Instant::now();

        for root in roots {
            if !root.exists() {
                return Err(FinderError::PathNotFound(root.clone()));
            }
            if !root.is_dir() {
                return Err(FinderError::NotADirectory(root.clone()));
            }
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut walker = Walker::new(roots.to_vec(), self.config.walker_config.clone())
            .with_capability(self.config.capability.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut classifier = SizeClassifier::new();
        let mut scan_errors = Vec::new();
        for (idx, result) in walker.walk().enumerate() {
            match result {
                Ok(entry) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(idx + 1, entry.path.to_string_lossy().as_ref());
                    }
                    classifier.classify(entry);
                }
                Err(e) => scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut summary = ScanSummary {
            scan_errors,
            ..Default::default()
        };
        if !summary.scan_errors.is_empty() {
            log::warn!(
                "{} entries could not be read during traversal",
                summary.scan_errors.len()
            );
        }

        let results = self.run(classifier, &mut summary)?;
        summary.scan_duration = start_time.elapsed();
        Ok((results, summary))
    }

    /// Find duplicates from a pre-collected list of entries.
    ///
    /// Use this method when entries come from another source than the
    /// built-in walker.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Interrupted` on shutdown, or
    /// `FinderError::ThreadPool` if the hashing pool can't be created.
    pub fn find_duplicates_from_entries(
        &self,
        entries: impl IntoIterator<Item = FileEntry>,
    ) -> Result<(Results, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut classifier = SizeClassifier::new();
        for entry in entries {
            classifier.classify(entry);
        }

        let mut summary = ScanSummary::default();
        let results = self.run(classifier, &mut summary)?;
        summary.scan_duration = start_time.elapsed();
        Ok((results, summary))
    }

    /// Everything downstream of ingestion.
    fn run(
        &self,
        mut classifier: SizeClassifier,
        summary: &mut ScanSummary,
    ) -> Result<Results, FinderError> {
        let empty = classifier.drop_or_capture_empty(self.config.ignore_empty);
        let pruned = classifier.prune_unique_sizes();
        log::debug!("Pruned {} unique size bucket(s)", pruned);
        classifier.filter_hardlinks(self.config.capability.as_ref());

        let (buckets, stats) = classifier.into_buckets();
        summary.total_entries = summary.scan_errors.len() + stats.total_entries;
        summary.total_files = stats.total_files;
        summary.total_size = stats.total_size;
        summary.ignored_entries = stats.ignored_entries;
        summary.empty_files = stats.empty_files;
        summary.empty_files_ignored = stats.empty_files_ignored;
        summary.eliminated_by_size = stats.eliminated_unique;
        summary.hardlinks_filtered = stats.hardlinks_filtered;

        log::info!(
            "Size grouping: {} files -> {} candidates in {} buckets ({:.1}% eliminated)",
            stats.total_files,
            stats.potential_duplicates,
            stats.duplicate_groups,
            stats.elimination_rate()
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let confirmed = self.run_checksum_engine(buckets, summary)?;
        let results = assemble(empty.group, confirmed, summary.total_files);

        summary.duplicate_groups = results.group_count();
        summary.duplicate_files = results.duplicates;
        summary.redundant_size = results.redundant_size;

        log::info!(
            "Scan complete: {} duplicate files in {} groups, {} redundant",
            summary.duplicate_files,
            summary.duplicate_groups,
            summary.redundant_display()
        );

        Ok(results)
    }

    /// Partial triage followed by full confirmation.
    fn run_checksum_engine(
        &self,
        buckets: HashMap<u64, Vec<FileRecord>>,
        summary: &mut ScanSummary,
    ) -> Result<Vec<DuplicateGroup>, FinderError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()?;

        let mut partial_sets: Vec<CandidateSet> = Vec::new();
        let mut full_sets: Vec<CandidateSet> = Vec::new();
        for (size, records) in buckets {
            if self.config.skip_partial || size < MIN_PARTIAL_SIZE {
                full_sets.push(records);
            } else {
                partial_sets.push(records);
            }
        }

        if !partial_sets.is_empty() {
            log::info!(
                "Partial pass: {} files in {} buckets",
                partial_sets.iter().map(Vec::len).sum::<usize>(),
                partial_sets.len()
            );
            let mut stats = StageStats::default();
            self.fingerprint_sets(
                &pool,
                FingerprintKind::Partial,
                &mut partial_sets,
                &mut stats,
                &mut summary.read_errors,
            )?;
            let candidates = self.regroup(FingerprintKind::Partial, partial_sets, &mut stats)?;
            log::info!(
                "Partial pass complete: {} -> {} candidates ({:.1}% eliminated)",
                stats.input_files,
                stats.matched_files,
                stats.elimination_rate()
            );
            full_sets.extend(candidates);
            summary.partial = stats;
        }

        let mut stats = StageStats::default();
        let mut confirmed = Vec::new();
        if !full_sets.is_empty() {
            log::info!(
                "Full pass: {} files in {} candidate sets",
                full_sets.iter().map(Vec::len).sum::<usize>(),
                full_sets.len()
            );
            self.fingerprint_sets(
                &pool,
                FingerprintKind::Full,
                &mut full_sets,
                &mut stats,
                &mut summary.read_errors,
            )?;
            for set in self.regroup(FingerprintKind::Full, full_sets, &mut stats)? {
                let size = set.first().map_or(0, |r| r.size);
                confirmed.push(DuplicateGroup::new(
                    size,
                    set.into_iter().map(|r| r.path).collect(),
                ));
            }
            log::info!(
                "Full pass complete: {} -> {} duplicates ({:.1}% eliminated)",
                stats.input_files,
                stats.matched_files,
                stats.elimination_rate()
            );
        }
        summary.full = stats;

        Ok(confirmed)
    }

    /// Compute `kind` fingerprints for every record of `sets`.
    ///
    /// Records are hashed in locality order on `pool`. Digests are attached
    /// after the pass; records that fail keep no fingerprint of that kind.
    fn fingerprint_sets(
        &self,
        pool: &rayon::ThreadPool,
        kind: FingerprintKind,
        sets: &mut [CandidateSet],
        stats: &mut StageStats,
        errors: &mut Vec<HashError>,
    ) -> Result<(), FinderError> {
        let mut work: Vec<WorkItem> = Vec::new();
        for (set_idx, set) in sets.iter().enumerate() {
            stats.input_files += set.len();
            for (record_idx, record) in set.iter().enumerate() {
                if record.fingerprint(kind).is_some() {
                    stats.reused_files += 1;
                } else {
                    work.push(WorkItem {
                        set: set_idx,
                        record: record_idx,
                    });
                }
            }
        }

        {
            let shared: &[CandidateSet] = sets;
            work.sort_by(|a, b| {
                let ra = &shared[a.set][a.record];
                let rb = &shared[b.set][b.record];
                ra.identity
                    .cmp(&rb.identity)
                    .then_with(|| path_order(&ra.path, &rb.path))
            });
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(kind.name(), work.len());
        }

        let shared: &[CandidateSet] = sets;
        let hashed: Vec<(WorkItem, Option<Result<Hash, HashError>>)> = pool.install(|| {
            work.par_iter()
                .enumerate()
                .map(|(idx, item)| {
                    if self.config.is_shutdown_requested() {
                        return (*item, None);
                    }
                    let record = &shared[item.set][item.record];
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(idx + 1, record.path.to_string_lossy().as_ref());
                    }
                    let result = self.hasher.fingerprint(kind, &record.path, record.size);
                    if result.is_ok() {
                        if let Some(ref callback) = self.config.progress_callback {
                            callback.on_item_completed(bytes_for(kind, record.size));
                        }
                    }
                    (*item, Some(result))
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(kind.name());
        }

        if self.config.is_shutdown_requested() {
            log::info!("{} pass interrupted by shutdown signal", kind);
            return Err(FinderError::Interrupted);
        }

        for (item, result) in hashed {
            let record = &mut sets[item.set][item.record];
            match result {
                Some(Ok(hash)) => {
                    log::trace!("{} {}: {}", kind, hash_to_hex(&hash), record.path.display());
                    stats.hashed_files += 1;
                    stats.bytes_read += bytes_for(kind, record.size);
                    record.set_fingerprint(kind, hash);
                }
                Some(Err(e)) => {
                    log::warn!("Failed to read {}: {}", record.path.display(), e);
                    stats.failed_files += 1;
                    errors.push(e);
                }
                None => return Err(FinderError::Interrupted),
            }
        }

        Ok(())
    }

    /// Split each set by `kind` fingerprint, keeping groups of two or more.
    ///
    /// Records without a fingerprint of `kind` (read failures) are dropped.
    /// Groups never span two input sets.
    fn regroup(
        &self,
        kind: FingerprintKind,
        sets: Vec<CandidateSet>,
        stats: &mut StageStats,
    ) -> Result<Vec<CandidateSet>, FinderError> {
        let mut out = Vec::new();
        let mut remaining: usize = sets.iter().map(Vec::len).sum();

        for set in sets {
            if self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }
            remaining -= set.len();

            let mut by_hash: HashMap<String, CandidateSet> = HashMap::new();
            for record in set {
                if let Some(hash) = record.fingerprint(kind) {
                    by_hash.entry(hash_to_hex(&hash)).or_default().push(record);
                }
            }

            for (hex, group) in by_hash {
                if group.len() < 2 {
                    stats.unique_dropped += group.len();
                    log::trace!("Dropping unique {} fingerprint {}", kind, hex);
                } else {
                    log::debug!("{} group {}: {} files", kind, hex, group.len());
                    stats.matched_groups += 1;
                    stats.matched_files += group.len();
                    out.push(group);
                }
            }
            log::debug!("{} pass: {} files left to group", kind, remaining);
        }

        Ok(out)
    }
}

/// Bytes a fingerprint of `kind` reads from a file of `size` bytes.
fn bytes_for(kind: FingerprintKind, size: u64) -> u64 {
    match kind {
        FingerprintKind::Partial if size > 2 * PARTIAL_WINDOW => 2 * PARTIAL_WINDOW,
        _ => size,
    }
}
