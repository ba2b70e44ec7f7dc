//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one or more
//! root directories and collecting file metadata for duplicate detection.
//! It uses [`jwalk`] for parallel directory reading.
//!
//! # Features
//!
//! - Parallel directory traversal using a rayon thread pool
//! - Deterministic order (children sorted by file name)
//! - Configurable symlink following
//! - Device/inode identity via an [`InodeCapability`]
//! - Graceful shutdown via atomic flag
//!
//! Every entry that is not a directory is yielded, including symlinks and
//! special files; the classifier decides what to keep. Entries that can't be
//! read are yielded as [`ScanError`] values and the walk continues.
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")], WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use jwalk::WalkDir;

use super::hardlink::{platform_capability, InodeCapability};
use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for parallel file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root paths to walk, in order
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Source of device/inode identities
    capability: Arc<dyn InodeCapability>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker over the given roots.
    ///
    /// # Arguments
    ///
    /// * `roots` - Root directories to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            roots,
            config,
            capability: platform_capability(),
            shutdown_flag: None,
        }
    }

    /// Replace the inode capability (defaults to the platform one).
    #[must_use]
    pub fn with_capability(mut self, capability: Arc<dyn InodeCapability>) -> Self {
        self.capability = capability;
        self
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker will stop iteration
    /// as soon as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root in order, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. A directory that can't be opened produces one error and
    /// its subtree is skipped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupsift::scanner::{Walker, WalkerConfig};
    /// use std::path::PathBuf;
    ///
    /// let walker = Walker::new(vec![PathBuf::from(".")], WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} entries", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        self.roots.iter().flat_map(move |root| self.walk_root(root))
    }

    fn walk_root<'a>(
        &'a self,
        root: &'a Path,
    ) -> impl Iterator<Item = Result<FileEntry, ScanError>> + 'a {
        log::debug!("Walking {}", root.display());

        let walk_dir = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(false)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    if entry.depth == 0 || entry.file_type().is_dir() {
                        return None;
                    }
                    Some(self.process_entry(entry.path(), entry.path_is_symlink()))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| root.to_path_buf(), std::borrow::ToOwned::to_owned);
                    Some(Err(Self::handle_jwalk_error(path, &e)))
                }
            })
    }

    /// Stat a non-directory entry and build its [`FileEntry`].
    fn process_entry(&self, path: PathBuf, is_symlink: bool) -> Result<FileEntry, ScanError> {
        let metadata = if self.config.follow_symlinks {
            std::fs::metadata(&path)
        } else {
            std::fs::symlink_metadata(&path)
        };

        let metadata = metadata.map_err(|e| Self::handle_io_error(&path, e))?;

        // A followed symlink resolving to a regular file counts as that file
        let is_symlink = is_symlink && !(self.config.follow_symlinks && metadata.is_file());
        let is_regular = metadata.is_file() && !is_symlink;

        if is_symlink {
            log::trace!("Symlink: {}", path.display());
        } else if !is_regular {
            log::trace!("Special file: {}", path.display());
        }

        Ok(FileEntry {
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            is_regular,
            is_symlink,
            identity: self.capability.device_inode_of(&metadata),
            path,
        })
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(path: &Path, error: std::io::Error) -> ScanError {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => log::warn!("Permission denied: {}", path.display()),
            std::io::ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
            }
            _ => log::warn!("I/O error for {}: {}", path.display(), error),
        }
        ScanError::from_io(path.to_path_buf(), error)
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(path: PathBuf, error: &jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        match error.io_error() {
            Some(io) => ScanError::from_io(path, std::io::Error::new(io.kind(), io.to_string())),
            None => ScanError::Io {
                path,
                source: std::io::Error::other(error.to_string()),
            },
        }
    }
}
