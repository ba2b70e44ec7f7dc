//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing the two kinds of
//! content fingerprint used by the duplicate engine:
//!
//! - **Partial**: a digest over the first [`PARTIAL_WINDOW`] bytes followed by
//!   the last [`PARTIAL_WINDOW`] bytes of the file. Only meaningful for files
//!   of at least [`MIN_PARTIAL_SIZE`] bytes, where the two windows can never
//!   overlap.
//! - **Full**: a digest over the entire file, streamed in fixed-size chunks.
//!
//! Every read is checked against the size recorded at scan time; a file that
//! shrank or grew since it was stat'ed yields [`HashError::ShortRead`].
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let size = std::fs::metadata("file.txt")?.len();
//! let digest = hasher.full(Path::new("file.txt"), size)?;
//! println!("{}", hash_to_hex(&digest));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// Size in bytes of each of the prefix and suffix windows.
pub const PARTIAL_WINDOW: u64 = 128;

/// Smallest file size that is triaged with a partial fingerprint.
///
/// Strictly greater than `2 * PARTIAL_WINDOW`.
pub const MIN_PARTIAL_SIZE: u64 = 49_152;

/// Read buffer for full hashing (64 KiB).
const BUFFER_SIZE: usize = 64 * 1024;

/// 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Encode a digest as lowercase hex.
///
/// # Example
///
/// ```
/// use dupsift::scanner::hash_to_hex;
///
/// let hex = hash_to_hex(&[0xab; 32]);
/// assert_eq!(hex.len(), 64);
/// assert!(hex.starts_with("abab"));
/// ```
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from_bytes(*hash).to_hex().to_string()
}

/// The two fingerprint kinds the engine computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerprintKind {
    /// Prefix + suffix window digest
    Partial,
    /// Whole-content digest
    Full,
}

impl FingerprintKind {
    /// Short lowercase name used in logs and summaries.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for FingerprintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Streaming BLAKE3 hasher.
///
/// Opens a fresh handle for every fingerprint and closes it before returning,
/// so a `Hasher` can be shared across worker threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Hasher {
    /// Chunk size for full reads
    buffer_size: usize,
    /// Optional shutdown flag, checked between chunks
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 64 KiB read buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: BUFFER_SIZE,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for aborting long full reads.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute a fingerprint of the given kind.
    ///
    /// # Arguments
    ///
    /// * `kind` - Partial or full
    /// * `path` - File to read
    /// * `size` - Size recorded at scan time
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file can't be opened or read, or if the
    /// number of bytes available doesn't match `size`.
    pub fn fingerprint(
        &self,
        kind: FingerprintKind,
        path: &Path,
        size: u64,
    ) -> Result<Hash, HashError> {
        match kind {
            FingerprintKind::Partial => self.partial(path, size),
            FingerprintKind::Full => self.full(path, size),
        }
    }

    /// Digest of the prefix and suffix windows.
    ///
    /// Files not larger than two windows are hashed whole, since their
    /// windows would overlap.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::ShortRead`] if either window can't be filled.
    pub fn partial(&self, path: &Path, size: u64) -> Result<Hash, HashError> {
        if size <= 2 * PARTIAL_WINDOW {
            return self.full(path, size);
        }

        let mut file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        let mut hasher = blake3::Hasher::new();
        let mut window = [0u8; PARTIAL_WINDOW as usize];

        read_window(&mut file, &mut window, path, size)?;
        hasher.update(&window);

        file.seek(SeekFrom::Start(size - PARTIAL_WINDOW))
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        read_window(&mut file, &mut window, path, size)?;
        hasher.update(&window);

        log::trace!("Partial fingerprint: {}", path.display());
        Ok(*hasher.finalize().as_bytes())
    }

    /// Digest of the whole file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::ShortRead`] if the byte count differs from `size`.
    pub fn full(&self, path: &Path, size: u64) -> Result<Hash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total: u64 = 0;

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::Interrupted, "shutdown requested"),
                });
            }

            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path.to_path_buf(), e)),
            };
            hasher.update(&buffer[..n]);
            total += n as u64;
        }

        if total != size {
            log::debug!(
                "Size changed during hashing: {} (expected {}, read {})",
                path.display(),
                size,
                total
            );
            return Err(HashError::ShortRead {
                path: path.to_path_buf(),
                expected: size,
                actual: total,
            });
        }

        log::trace!("Full fingerprint: {}", path.display());
        Ok(*hasher.finalize().as_bytes())
    }
}

/// Fill `window` completely or report a short read.
fn read_window(file: &mut File, window: &mut [u8], path: &Path, size: u64) -> Result<(), HashError> {
    let mut filled = 0;
    while filled < window.len() {
        match file.read(&mut window[filled..]) {
            Ok(0) => {
                return Err(HashError::ShortRead {
                    path: path.to_path_buf(),
                    expected: size,
                    actual: filled as u64,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(HashError::from_io(path.to_path_buf(), e)),
        }
    }
    Ok(())
}
