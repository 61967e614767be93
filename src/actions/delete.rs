//! File removal for resolved duplicate sets.
//!
//! # Overview
//!
//! This module provides the destructive half of deduplication:
//! - Permanent removal (default)
//! - Move to system trash (`--trash`, recoverable)
//! - Batch operations that continue past individual failures
//! - A guarded entry point for a [`Resolution`] that verifies the kept file
//!
//! # Safety
//!
//! [`delete_resolution`] refuses to remove anything unless the kept file
//! still exists and is not itself scheduled for removal, so at least one copy
//! of every set always survives.
//!
//! # Example
//!
//! ```no_run
//! use tunedupe::actions::delete::{delete_resolution, DeleteConfig};
//! use tunedupe::actions::resolve::{resolve, Choice};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a/x.mp3"), PathBuf::from("b/x.mp3")];
//! let resolution = resolve(&paths, Choice::Default).unwrap();
//!
//! match delete_resolution(&resolution, &DeleteConfig::permanent()) {
//!     Ok(result) => println!("{}", result.summary()),
//!     Err(e) => eprintln!("Skipped: {}", e),
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use thiserror::Error;

use super::resolve::Resolution;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Unlinking the file failed.
    #[error("remove failed for {path}: {message}")]
    RemoveFailed { path: PathBuf, message: String },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// The file chosen to keep is gone, so nothing is removed.
    #[error("kept file no longer exists: {0}")]
    KeptFileMissing(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::KeptFileMissing(p)
            | Self::RemoveFailed { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Paths that were removed, in the order they were attempted.
    pub fn removed_paths(&self) -> impl Iterator<Item = &Path> {
        self.successes.iter().map(|s| s.path.as_path())
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Removed {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Removed {} file(s), freed {}, {} failed",
                self.success_count(),
                freed,
                self.failure_count()
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Default)]
pub struct DeleteConfig {
    /// Move files to the system trash instead of unlinking them.
    pub trash: bool,
}

impl DeleteConfig {
    /// Create config for permanent deletion (the default).
    #[must_use]
    pub fn permanent() -> Self {
        Self::default()
    }

    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self { trash: true }
    }
}

fn file_size(path: &Path) -> Result<u64, DeleteError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| DeleteError::from_io(path, e))
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `RemoveFailed` if unlinking fails
///
/// # Example
///
/// ```no_run
/// use tunedupe::actions::delete::permanent_delete;
/// use std::path::Path;
///
/// match permanent_delete(Path::new("/music/copy of track.mp3")) {
///     Ok(result) => println!("Removed {} ({} bytes)", result.path.display(), result.size),
///     Err(e) => eprintln!("Failed: {}", e),
/// }
/// ```
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|e| {
        log::error!("Remove failed for {}: {}", path.display(), e);
        DeleteError::RemoveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Removed: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Delete multiple files, attempting every one even when some fail.
pub fn delete_batch(paths: &[PathBuf], config: &DeleteConfig) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        let outcome = if config.trash {
            delete_to_trash(path)
        } else {
            permanent_delete(path)
        };

        match outcome {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(e) => {
                let message = e.to_string();
                log::warn!("Failed to delete {}: {}", path.display(), message);
                result.failures.push((path.clone(), message));
            }
        }
    }

    log::info!("{}", result.summary());

    result
}

/// Permanently remove every path in `paths`, continuing past failures.
///
/// # Example
///
/// ```no_run
/// use tunedupe::actions::delete::delete;
/// use std::path::PathBuf;
///
/// let result = delete(&[PathBuf::from("a/x.mp3")]);
/// println!("{}", result.summary());
/// ```
pub fn delete(paths: &[PathBuf]) -> BatchDeleteResult {
    delete_batch(paths, &DeleteConfig::permanent())
}

/// Remove the non-kept members of a resolved set.
///
/// # Errors
///
/// Nothing is removed and:
/// - `AllCopiesWouldBeDeleted` is returned if the kept path is also listed for removal
/// - `KeptFileMissing` is returned if the kept file no longer exists
///
/// Individual removal failures do not abort; they are reported in the
/// returned `BatchDeleteResult`.
pub fn delete_resolution(
    resolution: &Resolution,
    config: &DeleteConfig,
) -> Result<BatchDeleteResult, DeleteError> {
    let group: Vec<PathBuf> = resolution.all_paths().cloned().collect();
    validate_preserves_copy(&resolution.remove, &group)?;

    if !resolution.kept.is_file() {
        log::warn!(
            "Kept file {} is missing, leaving set untouched",
            resolution.kept.display()
        );
        return Err(DeleteError::KeptFileMissing(resolution.kept.clone()));
    }

    Ok(delete_batch(&resolution.remove, config))
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if no member of `group_paths` is left
/// out of `selected_paths`.
///
/// # Example
///
/// ```
/// use tunedupe::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![PathBuf::from("/a.mp3"), PathBuf::from("/b.mp3")];
///
/// assert!(validate_preserves_copy(&[PathBuf::from("/b.mp3")], &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate set",
            group_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        log::debug!(
            "Deletion validated: {} files selected, {} preserved",
            selected_paths.len(),
            preserved_count
        );
        Ok(())
    }
}
