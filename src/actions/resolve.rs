//! Choosing which member of a duplicate set survives.
//!
//! Resolution is a pure decision: it names the kept path and the paths to
//! remove, and never touches the filesystem. Removal is done separately by
//! [`crate::actions::delete::delete_resolution`].
//!
//! # Example
//!
//! ```
//! use tunedupe::actions::resolve::{resolve, Choice};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a/x.mp3"), PathBuf::from("b/x.mp3")];
//! let resolution = resolve(&paths, Choice::Index(2)).unwrap();
//!
//! assert_eq!(resolution.kept, PathBuf::from("b/x.mp3"));
//! assert_eq!(resolution.remove, vec![PathBuf::from("a/x.mp3")]);
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::duplicates::groups::path_len;

/// Which member of a set to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Choice {
    /// The shortest path, ties broken lexicographically.
    #[default]
    Default,
    /// An explicit member, 1-based.
    Index(usize),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Index(k) => write!(f, "{}", k),
        }
    }
}

/// An explicit choice outside `1..=len`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid choice {choice}: pick a number between 1 and {len}")]
pub struct InvalidChoiceError {
    /// The rejected choice
    pub choice: Choice,
    /// Number of members in the set
    pub len: usize,
}

/// The outcome of resolving a set: one survivor and everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The path that stays on disk
    pub kept: PathBuf,
    /// Every other member, in set order
    pub remove: Vec<PathBuf>,
}

impl Resolution {
    /// The kept path followed by the removals.
    pub fn all_paths(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.kept).chain(self.remove.iter())
    }
}

/// Zero-based index of the default member: shortest path, ties lexicographic.
///
/// Does not depend on the order of `paths`.
#[must_use]
pub fn default_index(paths: &[PathBuf]) -> Option<usize> {
    paths
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| path_len(a).cmp(&path_len(b)).then_with(|| a.cmp(b)))
        .map(|(i, _)| i)
}

/// Decide which member of `paths` to keep.
///
/// # Errors
///
/// `InvalidChoiceError` when `choice` is `Index(k)` with `k` outside
/// `1..=paths.len()`, or when `paths` is empty.
pub fn resolve(paths: &[PathBuf], choice: Choice) -> Result<Resolution, InvalidChoiceError> {
    let invalid = || InvalidChoiceError {
        choice,
        len: paths.len(),
    };

    let index = match choice {
        Choice::Default => default_index(paths).ok_or_else(invalid)?,
        Choice::Index(k) if (1..=paths.len()).contains(&k) => k - 1,
        Choice::Index(_) => return Err(invalid()),
    };

    let kept = paths[index].clone();
    let remove = paths
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, p)| p.clone())
        .collect();

    log::debug!("Keeping {} ({} choice)", kept.display(), choice);
    Ok(Resolution { kept, remove })
}
