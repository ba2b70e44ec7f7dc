//! Hard-link detection for avoiding false duplicate identification.
//!
//! # Overview
//!
//! Hard links are multiple directory entries pointing to the same inode on disk.
//! They share the same content but are NOT duplicates - they're the same file.
//! This module provides the device/inode capability layer and the filter that
//! collapses hard links inside a size bucket to a single representative.
//!
//! # Platform Support
//!
//! - **Unix**: Uses (device_id, inode) pairs from file metadata
//! - **Other**: Identity is always [`DeviceInode::Unsupported`] and filtering
//!   is a no-op (every path is an independent candidate)
//!
//! # Example
//!
//! ```
//! use dupsift::scanner::hardlink::{filter_hardlinks, NoInodeCapability};
//! use dupsift::scanner::DeviceInode;
//!
//! let mut ids = vec![DeviceInode::Unsupported, DeviceInode::Unsupported];
//! let removed = filter_hardlinks(&mut ids, &NoInodeCapability, |id| *id);
//! assert_eq!(removed, 0);
//! assert_eq!(ids.len(), 2);
//! ```

use std::collections::HashSet;
use std::fs::Metadata;
use std::sync::Arc;

use super::DeviceInode;

/// Platform capability exposing device/inode identity of files.
///
/// Implementations are selected by [`platform_capability`]; tests can
/// substitute [`NoInodeCapability`] to exercise the unsupported path on any
/// platform.
pub trait InodeCapability: Send + Sync + std::fmt::Debug {
    /// Whether this platform exposes inode identity at all.
    fn supports_inode_identity(&self) -> bool;

    /// Identity of the file described by `metadata`.
    fn device_inode_of(&self, metadata: &Metadata) -> DeviceInode;
}

/// Device/inode identity from Unix `stat` data.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixInodeCapability;

#[cfg(unix)]
impl InodeCapability for UnixInodeCapability {
    fn supports_inode_identity(&self) -> bool {
        true
    }

    fn device_inode_of(&self, metadata: &Metadata) -> DeviceInode {
        use std::os::unix::fs::MetadataExt;
        DeviceInode::Supported {
            dev: metadata.dev(),
            ino: metadata.ino(),
        }
    }
}

/// Capability for platforms without inode semantics.
///
/// Windows metadata doesn't expose the file index without opening a handle,
/// so it is treated the same as any other platform lacking inodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInodeCapability;

impl InodeCapability for NoInodeCapability {
    fn supports_inode_identity(&self) -> bool {
        false
    }

    fn device_inode_of(&self, _metadata: &Metadata) -> DeviceInode {
        DeviceInode::Unsupported
    }
}

/// The capability implementation for the current build target.
#[must_use]
pub fn platform_capability() -> Arc<dyn InodeCapability> {
    #[cfg(unix)]
    {
        Arc::new(UnixInodeCapability)
    }
    #[cfg(not(unix))]
    {
        Arc::new(NoInodeCapability)
    }
}

/// Tracks seen identities to detect hard links.
///
/// The tracker remembers which identities have been seen and reports
/// subsequent occurrences as hard links. Unsupported identities are never
/// recorded.
///
/// # Thread Safety
///
/// `HardlinkTracker` is NOT thread-safe. Create one per bucket.
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    /// Set of seen identities
    seen: HashSet<DeviceInode>,
}

impl HardlinkTracker {
    /// Create a new hard-link tracker.
    ///
    /// # Example
    ///
    /// ```
    /// use dupsift::scanner::hardlink::HardlinkTracker;
    ///
    /// let tracker = HardlinkTracker::new();
    /// assert_eq!(tracker.seen_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Create a tracker with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Check if `identity` was already seen, recording it otherwise.
    ///
    /// Returns `false` for the first occurrence and for every
    /// `Unsupported` identity.
    pub fn is_hardlink(&mut self, identity: DeviceInode) -> bool {
        if !identity.is_supported() {
            return false;
        }
        !self.seen.insert(identity)
    }

    /// Get the number of unique identities tracked.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Collapse records sharing one supported device/inode identity.
///
/// Scans `records` once, in order, keeping the first record of each identity
/// and removing the rest. Returns the number of removed records. When the
/// capability reports no inode support this is a no-op returning zero.
///
/// # Arguments
///
/// * `records` - Records of a single size bucket
/// * `capability` - Platform inode capability
/// * `identity_of` - Accessor for a record's identity
pub fn filter_hardlinks<T, F>(
    records: &mut Vec<T>,
    capability: &dyn InodeCapability,
    identity_of: F,
) -> usize
where
    F: Fn(&T) -> DeviceInode,
{
    if !capability.supports_inode_identity() {
        return 0;
    }

    let before = records.len();
    let mut tracker = HardlinkTracker::with_capacity(before);
    records.retain(|record| !tracker.is_hardlink(identity_of(record)));
    before - records.len()
}
