//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes whole-file BLAKE3 digests by streaming the file in
//! fixed [`CHUNK_SIZE`] chunks, so memory use does not grow with file size.
//! Digests are 32 bytes and are reported as 64 lowercase hex characters.
//!
//! [`files_identical`] is the byte-for-byte check used by paranoid mode.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Read buffer size used when streaming file contents (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Streaming content hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    /// Optional shutdown flag checked between chunks
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown flag. Hashing a file aborts between chunks once it is set.
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

    /// Hash the full contents of a file.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if the file cannot be opened or read, or
    /// `HashError::Interrupted` if shutdown was requested mid-file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tunedupe::scanner::{hash_to_hex, Hasher};
    /// use std::path::Path;
    ///
    /// let hash = Hasher::new().full_hash(Path::new("track.mp3")).unwrap();
    /// println!("{}", hash_to_hex(&hash));
    /// ```
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_reader(path, file)
    }

    /// Hash everything readable from `reader`, attributing errors to `path`.
    ///
    /// # Errors
    ///
    /// Returns `HashError` on read failure or interruption.
    pub fn hash_reader<R: Read>(&self, path: &Path, reader: R) -> Result<Hash, HashError> {
        let mut reader = BufReader::with_capacity(CHUNK_SIZE, reader);
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Encode a digest as lowercase hex.
///
/// # Example
///
/// ```
/// use tunedupe::scanner::hash_to_hex;
///
/// assert_eq!(hash_to_hex(&[0xab; 32]).len(), 64);
/// assert!(hash_to_hex(&[0xab; 32]).starts_with("abab"));
/// ```
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Compare two files byte for byte.
///
/// # Errors
///
/// Returns `HashError` if either file cannot be opened or read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, HashError> {
    let file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
    let file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

    let len_a = file_a.metadata().map_err(|e| HashError::from_io(a, e))?.len();
    let len_b = file_b.metadata().map_err(|e| HashError::from_io(b, e))?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut reader_a = BufReader::with_capacity(CHUNK_SIZE, file_a);
    let mut reader_b = BufReader::with_capacity(CHUNK_SIZE, file_b);
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = read_full(&mut reader_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
        let read_b = read_full(&mut reader_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;

        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; short only at end of input.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
