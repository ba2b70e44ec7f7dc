//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping, empty files and hard links ([`groups`])
//! - Staged partial/full fingerprinting ([`finder`])
//! - Result assembly and ordering

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary, StageStats};
pub use groups::{
    assemble, DuplicateGroup, EmptyOutcome, FileRecord, GroupingStats, Results, SizeClassifier,
};
