//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a music library
//! and collecting candidate files for duplicate detection.
//!
//! # Features
//!
//! - Deterministic order: directory entries are sorted by file name
//! - Extension filtering (case-insensitive)
//! - Size filtering (min/max)
//! - Hidden file filtering
//! - Symbolic links are skipped, never followed, so link cycles cannot loop
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use tunedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Music"), WalkerConfig::default());
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

use walkdir::{DirEntry, WalkDir};

use super::{ExtensionSet, FileEntry, ScanError, WalkerConfig};

/// Directory walker for candidate discovery.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tunedupe::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
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

    /// Make sure the root exists, is a directory and can be listed.
    ///
    /// # Errors
    ///
    /// `ScanError::NotFound`, `ScanError::NotADirectory` or the error from
    /// opening the directory (usually `ScanError::PermissionDenied`).
    pub fn validate_root(&self) -> Result<(), ScanError> {
        match std::fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => std::fs::read_dir(&self.root)
                .map(|_| ())
                .map_err(|e| ScanError::from_io(&self.root, e)),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScanError::NotFound(self.root.clone()))
            }
            Err(e) => Err(ScanError::from_io(&self.root, e)),
        }
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    }

    /// Walk the directory tree, yielding candidate file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. The order is stable across walks of an unchanged tree.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tunedupe::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} audio files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> {
        self.clone().into_walk()
    }

    /// Walk the directory tree, consuming the walker.
    ///
    /// Same as [`Walker::walk`], for callers that want an iterator that
    /// owns its state.
    pub fn into_walk(self) -> impl Iterator<Item = Result<FileEntry, ScanError>> {
        let root = self.root.clone();
        let skip_hidden = self.config.skip_hidden;
        let walker = Arc::new(self);
        let stop = Arc::clone(&walker);

        WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !(skip_hidden && Self::is_hidden(entry)))
            .take_while(move |_| {
                if stop.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => walker.process_entry(&entry),
                Err(e) => Some(Err(walker.handle_walkdir_error(e))),
            })
    }

    /// Turn a directory entry into a candidate, if it is one.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", entry.path().display());
            return None;
        }
        if !file_type.is_file() {
            return None;
        }
        if !self.config.extensions.matches(entry.path()) {
            log::trace!("Skipping non-audio file: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walkdir_error(e))),
        };

        let size = metadata.len();
        if !self.config.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                entry.path().display()
            );
            return None;
        }

        Some(Ok(FileEntry::new(entry.path().to_path_buf(), size)))
    }

    /// Convert walkdir errors into scan errors.
    fn handle_walkdir_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        match error.into_io_error() {
            Some(io_error) => {
                log::warn!("Walker error for {}: {}", path.display(), io_error);
                ScanError::from_io(&path, io_error)
            }
            None => {
                log::warn!("Walker error for {}: filesystem loop", path.display());
                ScanError::Io {
                    path,
                    source: std::io::Error::other("filesystem loop detected"),
                }
            }
        }
    }
}

/// Recursively list every file under `root` whose extension is in `extensions`.
///
/// The returned iterator is lazy and yields paths in a deterministic order.
/// Per-entry traversal failures are yielded as `Err` items.
///
/// # Errors
///
/// Fails up front with `ScanError::NotFound` when `root` does not exist and
/// `ScanError::NotADirectory` when it is not a directory.
///
/// # Example
///
/// ```no_run
/// use tunedupe::scanner::{enumerate_candidates, ExtensionSet};
/// use std::path::Path;
///
/// let paths: Vec<_> = enumerate_candidates(Path::new("/music"), &ExtensionSet::audio())
///     .unwrap()
///     .filter_map(Result::ok)
///     .collect();
/// ```
pub fn enumerate_candidates(
    root: &Path,
    extensions: &ExtensionSet,
) -> Result<impl Iterator<Item = Result<PathBuf, ScanError>>, ScanError> {
    let walker = Walker::new(root, WalkerConfig::new(extensions.clone()));
    walker.validate_root()?;
    Ok(walker.into_walk().map(|entry| entry.map(|file| file.path)))
}
