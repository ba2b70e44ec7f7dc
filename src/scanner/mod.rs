//! Scanner module: file metadata ingestion, device/inode identity and hashing.
//!
//! This module provides functionality for:
//! - Directory walking over one or more roots using jwalk
//! - Device/inode identity behind a platform capability
//! - Hard-link filtering within size buckets
//! - Partial (prefix + suffix window) and full content fingerprints with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal producing [`FileEntry`] records
//! - [`hardlink`]: Inode capability layer and the hard-link filter
//! - [`hasher`]: BLAKE3 fingerprinting (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hardlink;
pub mod hasher;
pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

// Re-export main types
pub use hardlink::{platform_capability, InodeCapability, NoInodeCapability};
pub use hasher::{hash_to_hex, FingerprintKind, Hash, Hasher, MIN_PARTIAL_SIZE, PARTIAL_WINDOW};
pub use walker::Walker;

/// Identity of the underlying storage of a file.
///
/// Two entries with equal `Supported` values are the same file reached
/// through different directory entries (hard links). `Unsupported` values
/// never compare as the same storage, even with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceInode {
    /// A real (device id, inode number) pair
    Supported {
        /// Device id
        dev: u64,
        /// Inode number
        ino: u64,
    },
    /// The platform or entry exposes no inode identity
    Unsupported,
}

impl DeviceInode {
    /// Whether this identity can be used for hard-link detection.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported { .. })
    }
}

/// Metadata for a discovered directory entry, as produced by the walker.
///
/// This is the raw ingest record: symlinks and special files are still
/// present here and are dropped by the engine when classified.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path to the file, as discovered under its root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Whether this entry is a regular file
    pub is_regular: bool,
    /// Whether this entry is a symbolic link
    pub is_symlink: bool,
    /// Device/inode identity, or `Unsupported`
    pub identity: DeviceInode,
}

impl FileEntry {
    /// Create a new regular-file entry without inode identity.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
            is_regular: true,
            is_symlink: false,
            identity: DeviceInode::Unsupported,
        }
    }

    /// Attach a device/inode identity.
    #[must_use]
    pub fn with_identity(mut self, identity: DeviceInode) -> Self {
        self.identity = identity;
        self
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

/// Errors that can occur during directory scanning.
///
/// All of these are non-fatal: the entry is skipped and counted.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Errors that can occur while fingerprinting a file.
///
/// A file that fails is dropped from its candidate group; the run continues.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Fewer (or more) bytes were read than the recorded file size.
    #[error("Short read for {path}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Path of the file
        path: PathBuf,
        /// Size recorded at scan time
        expected: u64,
        /// Bytes actually read
        actual: u64,
    },

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}
