//! Size classification, duplicate groups and result assembly.
//!
//! # Overview
//!
//! This module holds the in-memory working set of a run and the pure
//! transformations at both ends of the checksum engine:
//!
//! - [`SizeClassifier`] buckets [`FileRecord`]s by exact size, prunes sizes
//!   that can't have duplicates, special-cases zero-length files and applies
//!   the hard-link filter per bucket.
//! - [`assemble`] turns confirmed groups into the deterministic, sorted
//!   [`Results`] handed to the renderers.
//!
//! Files with different sizes cannot be duplicates, so size grouping
//! eliminates most candidates before any file is opened.
//!
//! # Example
//!
//! ```
//! use dupsift::scanner::FileEntry;
//! use dupsift::duplicates::SizeClassifier;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let mut classifier = SizeClassifier::new();
//! for (path, size) in [("/a", 10), ("/b", 10), ("/c", 20)] {
//!     classifier.classify(FileEntry::new(PathBuf::from(path), size, SystemTime::now()));
//! }
//!
//! assert_eq!(classifier.prune_unique_sizes(), 1);
//! assert_eq!(classifier.bucket_count(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::scanner::hardlink::{filter_hardlinks, InodeCapability};
use crate::scanner::{DeviceInode, FileEntry, FingerprintKind, Hash};

/// One regular file under consideration.
///
/// Created from a [`FileEntry`] by the classifier. Fingerprints are attached
/// by the checksum engine, at most once per kind.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Device/inode identity
    pub identity: DeviceInode,
    /// Prefix + suffix fingerprint, once computed
    pub partial: Option<Hash>,
    /// Whole-content fingerprint, once computed
    pub full: Option<Hash>,
}

impl FileRecord {
    /// Build a record from a walker entry.
    #[must_use]
    pub fn from_entry(entry: FileEntry) -> Self {
        Self {
            path: entry.path,
            size: entry.size,
            modified: entry.modified,
            identity: entry.identity,
            partial: None,
            full: None,
        }
    }

    /// The fingerprint of `kind`, if already computed.
    #[must_use]
    pub fn fingerprint(&self, kind: FingerprintKind) -> Option<Hash> {
        match kind {
            FingerprintKind::Partial => self.partial,
            FingerprintKind::Full => self.full,
        }
    }

    /// Attach a fingerprint. An existing fingerprint of that kind is kept.
    pub fn set_fingerprint(&mut self, kind: FingerprintKind, hash: Hash) {
        let slot = match kind {
            FingerprintKind::Partial => &mut self.partial,
            FingerprintKind::Full => &mut self.full,
        };
        if slot.is_none() {
            *slot = Some(hash);
        }
    }
}

/// Compare paths by their raw string form.
///
/// `PathBuf`'s own `Ord` compares component-wise, which differs from plain
/// lexicographic order for separators.
pub(crate) fn path_order(a: &Path, b: &Path) -> std::cmp::Ordering {
    a.as_os_str().cmp(b.as_os_str())
}

/// Statistics from the classification phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingStats {
    /// Entries offered to the classifier
    pub total_entries: usize,
    /// Regular files accepted into buckets
    pub total_files: usize,
    /// Total size of accepted files in bytes
    pub total_size: u64,
    /// Symlinks and special files skipped
    pub ignored_entries: usize,
    /// Paths seen more than once (overlapping roots)
    pub duplicate_paths: usize,
    /// Zero-length files seen
    pub empty_files: usize,
    /// Zero-length files discarded because empty files are ignored
    pub empty_files_ignored: usize,
    /// Files dropped because no other file had the same size
    pub eliminated_unique: usize,
    /// Files removed as hard links of another record
    pub hardlinks_filtered: usize,
    /// Files left in buckets after pruning and hard-link filtering
    pub potential_duplicates: usize,
    /// Buckets left after pruning and hard-link filtering
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// What happened to the zero-length bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyOutcome {
    /// Empty files discarded because they are ignored
    pub ignored: usize,
    /// The group of all empty files, when there were at least two
    pub group: Option<DuplicateGroup>,
}

/// Buckets file records by exact size.
///
/// Owns the working set between ingestion and hashing. Every bucket left
/// after [`prune_unique_sizes`](Self::prune_unique_sizes) holds at least two
/// records.
#[derive(Debug, Default)]
pub struct SizeClassifier {
    buckets: HashMap<u64, Vec<FileRecord>>,
    seen_paths: HashSet<PathBuf>,
    stats: GroupingStats,
}

impl SizeClassifier {
    /// Create an empty classifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry into the bucket for its size.
    ///
    /// Symlinks and special files are counted as ignored. A path already
    /// classified is skipped. Returns `true` if the entry was accepted.
    pub fn classify(&mut self, entry: FileEntry) -> bool {
        self.stats.total_entries += 1;

        if entry.is_symlink || !entry.is_regular {
            log::trace!("Ignoring non-regular entry: {}", entry.path.display());
            self.stats.ignored_entries += 1;
            return false;
        }

        if !self.seen_paths.insert(entry.path.clone()) {
            log::debug!("Path already classified: {}", entry.path.display());
            self.stats.duplicate_paths += 1;
            return false;
        }

        self.stats.total_files += 1;
        self.stats.total_size += entry.size;
        if entry.size == 0 {
            self.stats.empty_files += 1;
        }

        self.buckets
            .entry(entry.size)
            .or_default()
            .push(FileRecord::from_entry(entry));
        true
    }

    /// Remove every bucket holding fewer than two records.
    ///
    /// Returns the number of buckets removed.
    pub fn prune_unique_sizes(&mut self) -> usize {
        let before = self.buckets.len();
        let mut eliminated = 0;
        self.buckets.retain(|size, records| {
            if records.len() < 2 {
                eliminated += records.len();
                log::trace!("Eliminated unique size {}", size);
                false
            } else {
                true
            }
        });
        self.stats.eliminated_unique += eliminated;
        before - self.buckets.len()
    }

    /// Take the zero-length bucket out of the working set.
    ///
    /// With `ignore_empty` the records are discarded and counted. Otherwise
    /// two or more empty files become one group of size 0; a single empty
    /// file is dropped like any other unique size. The bucket is always
    /// removed.
    pub fn drop_or_capture_empty(&mut self, ignore_empty: bool) -> EmptyOutcome {
        let Some(records) = self.buckets.remove(&0) else {
            return EmptyOutcome::default();
        };

        if ignore_empty {
            log::debug!("Ignoring {} empty file(s)", records.len());
            self.stats.empty_files_ignored += records.len();
            return EmptyOutcome {
                ignored: records.len(),
                group: None,
            };
        }

        if records.len() < 2 {
            self.stats.eliminated_unique += records.len();
            return EmptyOutcome::default();
        }

        log::debug!("Empty-file group: {} files", records.len());
        EmptyOutcome {
            ignored: 0,
            group: Some(DuplicateGroup::new(
                0,
                records.into_iter().map(|r| r.path).collect(),
            )),
        }
    }

    /// Apply the hard-link filter to every bucket.
    ///
    /// Each bucket is sorted by path first, so the surviving representative
    /// of a set of hard links is the one with the smallest path. Buckets
    /// that drop below two records are removed. Returns the number of
    /// records filtered.
    pub fn filter_hardlinks(&mut self, capability: &dyn InodeCapability) -> usize {
        if !capability.supports_inode_identity() {
            log::debug!("Inode identity unsupported, hard-link filter skipped");
            return 0;
        }

        let mut filtered = 0;
        let mut collapsed = 0;
        self.buckets.retain(|size, records| {
            records.sort_by(|a, b| path_order(&a.path, &b.path));
            let removed = filter_hardlinks(records, capability, |r| r.identity);
            if removed > 0 {
                log::debug!("Size {}: {} hard link(s) filtered", size, removed);
            }
            filtered += removed;
            if records.len() < 2 {
                collapsed += records.len();
                false
            } else {
                true
            }
        });

        self.stats.hardlinks_filtered += filtered;
        self.stats.eliminated_unique += collapsed;
        filtered
    }

    /// Number of live buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of records across all live buckets.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Statistics gathered so far.
    #[must_use]
    pub fn stats(&self) -> &GroupingStats {
        &self.stats
    }

    /// Hand the working set over to the checksum engine.
    #[must_use]
    pub fn into_buckets(mut self) -> (HashMap<u64, Vec<FileRecord>>, GroupingStats) {
        self.stats.potential_duplicates = self.record_count();
        self.stats.duplicate_groups = self.buckets.len();
        (self.buckets, self.stats)
    }
}

/// Confirmed duplicate group of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Member paths, sorted lexicographically
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group. Paths are sorted.
    ///
    /// # Arguments
    ///
    /// * `size` - File size in bytes
    /// * `paths` - Member paths in any order
    #[must_use]
    pub fn new(size: u64, mut paths: Vec<PathBuf>) -> Self {
        paths.sort_by(|a, b| path_order(a, b));
        Self { size, paths }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Smallest member path.
    #[must_use]
    pub fn first_path(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }
}

/// Aggregate results of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    /// Groups sorted by size, then by first path
    pub groups: Vec<DuplicateGroup>,
    /// Total members across all groups
    pub duplicates: usize,
    /// Sum of `size * (members - 1)` over groups
    pub redundant_size: u64,
    /// Regular files scanned
    pub total_files: usize,
}

impl Results {
    /// Number of duplicate groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Whether any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Build the final, deterministically ordered results.
///
/// Members of each group are sorted by path; groups are sorted by ascending
/// size, ties broken by the smallest member path. Groups with fewer than two
/// members are dropped.
///
/// # Example
///
/// ```
/// use dupsift::duplicates::{assemble, DuplicateGroup};
/// use std::path::PathBuf;
///
/// let confirmed = vec![
///     DuplicateGroup::new(100, vec![PathBuf::from("/y"), PathBuf::from("/x"), PathBuf::from("/z")]),
///     DuplicateGroup::new(10, vec![PathBuf::from("/b"), PathBuf::from("/a")]),
/// ];
/// let results = assemble(None, confirmed, 7);
///
/// assert_eq!(results.groups[0].size, 10);
/// assert_eq!(results.groups[0].paths[0], PathBuf::from("/a"));
/// assert_eq!(results.duplicates, 5);
/// assert_eq!(results.redundant_size, 10 + 200);
/// ```
#[must_use]
pub fn assemble(
    empty: Option<DuplicateGroup>,
    confirmed: Vec<DuplicateGroup>,
    total_files: usize,
) -> Results {
    let mut groups: Vec<DuplicateGroup> = empty
        .into_iter()
        .chain(confirmed)
        .filter(|g| g.len() >= 2)
        .map(|g| DuplicateGroup::new(g.size, g.paths))
        .collect();

    groups.sort_by(|a, b| {
        a.size.cmp(&b.size).then_with(|| match (a.first_path(), b.first_path()) {
            (Some(x), Some(y)) => path_order(x, y),
            _ => std::cmp::Ordering::Equal,
        })
    });

    let duplicates = groups.iter().map(DuplicateGroup::len).sum();
    let redundant_size = groups.iter().map(DuplicateGroup::wasted_space).sum();

    Results {
        groups,
        duplicates,
        redundant_size,
        total_files,
    }
}
