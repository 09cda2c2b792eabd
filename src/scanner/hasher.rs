//! BLAKE3 file hasher with streaming and memory-mapped modes.
//!
//! # Overview
//!
//! [`Hasher`] computes the BLAKE3 digest of a file's entire content. Small
//! files are streamed through a fixed-size buffer; files at or above the
//! memory-map threshold are mapped and hashed in one pass. Both modes produce
//! identical digests.
//!
//! Records store digests as 64 lowercase hex characters, see [`hash_to_hex`].
//!
//! # Example
//!
//! ```no_run
//! use fintc::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.digest_file(Path::new("/etc/hostname")).unwrap();
//! assert_eq!(digest.len(), 64);
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use memmap2::Mmap;

use super::HashError;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Length of a digest rendered as hex.
pub const DIGEST_HEX_LEN: usize = 64;

/// Read buffer size for streaming mode.
const BUFFER_SIZE: usize = 64 * 1024;

/// Files at or above this size are memory-mapped by default (16 MiB).
pub const DEFAULT_MMAP_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Whole-file BLAKE3 hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    use_mmap: bool,
    mmap_threshold: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with memory mapping enabled at the default threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            use_mmap: true,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }

    /// Enable or disable memory-mapped hashing.
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Set the minimum file size (bytes) for memory-mapped hashing.
    #[must_use]
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    /// Compute the BLAKE3 hash of the file's full content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read. A file that
    /// disappears between enumeration and hashing reports
    /// [`HashError::NotFound`].
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();

        // Zero-length maps are rejected on some platforms.
        if self.use_mmap && len > 0 && len >= self.mmap_threshold {
            match hash_mmap(&file) {
                Ok(hash) => return Ok(hash),
                Err(e) => log::debug!(
                    "mmap failed for {}, falling back to streaming: {}",
                    path.display(),
                    e
                ),
            }
        }

        hash_stream(&mut file).map_err(|e| HashError::from_io(path, e))
    }

    /// Compute the digest of a file as lowercase hex.
    ///
    /// # Errors
    ///
    /// See [`Hasher::full_hash`].
    pub fn digest_file(&self, path: &Path) -> Result<String, HashError> {
        self.full_hash(path).map(|hash| hash_to_hex(&hash))
    }
}

fn hash_stream(file: &mut File) -> std::io::Result<Hash> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }

    Ok(*hasher.finalize().as_bytes())
}

fn hash_mmap(file: &File) -> std::io::Result<Hash> {
    // SAFETY: the mapping is read-only and dropped before returning. Another
    // process truncating the file while it is mapped is the usual mmap caveat.
    let map = unsafe { Mmap::map(file)? };
    let mut hasher = blake3::Hasher::new();
    hasher.update(&map);
    Ok(*hasher.finalize().as_bytes())
}

/// Digest of an in-memory buffer as lowercase hex.
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> String {
    hash_to_hex(blake3::hash(bytes).as_bytes())
}

/// Render a hash as 64 lowercase hex characters.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Parse 64 lowercase hex characters back into a hash.
///
/// Returns `None` for any other length or for characters outside `[0-9a-f]`.
#[must_use]
pub fn hex_to_hash(s: &str) -> Option<Hash> {
    if s.len() != DIGEST_HEX_LEN {
        return None;
    }

    let mut hash = [0u8; 32];
    for (i, pair) in s.as_bytes().chunks_exact(2).enumerate() {
        hash[i] = (hex_nibble(pair[0])? << 4) | hex_nibble(pair[1])?;
    }
    Some(hash)
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}
