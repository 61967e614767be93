//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! Grouping happens twice in the pipeline: first by byte size, then within
//! each size group by content digest. Both stages use the same generic
//! [`partition_by`], which keeps members in input order and returns an
//! ordered map so results never depend on hash-map iteration order.
//!
//! ## Size Grouping
//!
//! Size grouping is the cheap first pass. Files with different sizes cannot
//! be duplicates, so only size groups with two or more members are hashed.
//!
//! # Example
//!
//! ```
//! use tunedupe::duplicates::partition_by;
//!
//! let groups = partition_by(vec!["aa", "b", "cc", "d"], |s| s.len());
//!
//! assert_eq!(groups[&1], vec!["b", "d"]);
//! assert_eq!(groups[&2], vec!["aa", "cc"]);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::actions::resolve::{self, Choice, InvalidChoiceError, Resolution};
use crate::scanner::{hash_to_hex, FileEntry, Hash, ScanError};

/// Partition `items` by a key, preserving input order within each bucket.
///
/// Every item lands in exactly one bucket.
pub fn partition_by<T, K, F, I>(items: I, mut key: F) -> BTreeMap<K, Vec<T>>
where
    I: IntoIterator<Item = T>,
    K: Ord,
    F: FnMut(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

/// Drop every bucket with fewer than two members.
pub fn retain_duplicates<K: Ord, T>(groups: &mut BTreeMap<K, Vec<T>>) -> usize {
    let before: usize = groups.values().map(Vec::len).sum();
    groups.retain(|_, members| members.len() > 1);
    let after: usize = groups.values().map(Vec::len).sum();
    before - after
}

/// Statistics from the size grouping phase.
#[derive(Debug, Default)]
pub struct GroupingStats {
    /// Total number of paths offered for grouping
    pub total_files: usize,
    /// Total size of all grouped files in bytes
    pub total_size: u64,
    /// Number of distinct sizes
    pub unique_sizes: usize,
    /// Number of files that share their size with another file
    pub potential_duplicates: usize,
    /// Number of files alone in their size group
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
    /// Paths that could not be stat'ed
    pub errors: Vec<ScanError>,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group paths by their exact byte size.
///
/// Every path is stat'ed. A path that vanished or cannot be read is dropped
/// from the grouping, logged, and recorded in [`GroupingStats::errors`].
/// Singleton groups are kept in the returned map; callers that only want
/// potential duplicates use [`retain_duplicates`].
///
/// # Example
///
/// ```no_run
/// use tunedupe::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let (groups, stats) = group_by_size(vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]);
/// println!("{} distinct sizes, {} errors", groups.len(), stats.errors.len());
/// ```
pub fn group_by_size<I>(paths: I) -> (BTreeMap<u64, Vec<PathBuf>>, GroupingStats)
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut errors = Vec::new();
    let mut offered = 0;

    let entries: Vec<FileEntry> = paths
        .into_iter()
        .filter_map(|path| {
            offered += 1;
            match std::fs::metadata(&path) {
                Ok(metadata) => Some(FileEntry::new(path, metadata.len())),
                Err(e) => {
                    log::warn!("Cannot stat {}: {}", path.display(), e);
                    errors.push(ScanError::from_io(&path, e));
                    None
                }
            }
        })
        .collect();

    let (groups, mut stats) = group_entries_by_size(entries);
    stats.total_files = offered;
    stats.errors = errors;
    (groups, stats)
}

/// Group already-sized entries by byte size, without touching the filesystem.
///
/// This is the size stage of the finder, whose walker has read each size once.
pub fn group_entries_by_size<I>(entries: I) -> (BTreeMap<u64, Vec<PathBuf>>, GroupingStats)
where
    I: IntoIterator<Item = FileEntry>,
{
    let mut stats = GroupingStats::default();

    let groups: BTreeMap<u64, Vec<PathBuf>> = partition_by(entries, |entry| entry.size)
        .into_iter()
        .map(|(size, members)| (size, members.into_iter().map(|e| e.path).collect()))
        .collect();

    stats.unique_sizes = groups.len();
    for (size, members) in &groups {
        stats.total_files += members.len();
        stats.total_size += size * members.len() as u64;
        if members.len() > 1 {
            stats.potential_duplicates += members.len();
            stats.duplicate_groups += 1;
        } else {
            stats.eliminated_unique += 1;
        }
    }

    log::debug!(
        "Size grouping: {} files, {} distinct sizes, {} potential duplicates",
        stats.total_files,
        stats.unique_sizes,
        stats.potential_duplicates
    );

    (groups, stats)
}

/// Length of a path string in characters, the key for "shortest path first".
#[must_use]
pub fn path_len(path: &Path) -> usize {
    path.to_string_lossy().chars().count()
}

/// Order paths shortest first, ties broken lexicographically.
pub fn sort_shortest_first(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| path_len(a).cmp(&path_len(b)).then_with(|| a.cmp(b)));
}

/// A confirmed set of byte-identical files.
///
/// Paths are ordered shortest first; the set always has at least two members
/// when produced by the finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSet {
    /// BLAKE3 digest of the shared content
    #[serde(serialize_with = "serialize_hash")]
    pub digest: Hash,
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Member paths, shortest first
    pub paths: Vec<PathBuf>,
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

impl DuplicateSet {
    /// Create a duplicate set; member paths are put in shortest-first order.
    #[must_use]
    pub fn new(digest: Hash, size: u64, mut paths: Vec<PathBuf>) -> Self {
        sort_shortest_first(&mut paths);
        Self {
            digest,
            size,
            paths,
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Member by 1-based index, as shown in the prompt.
    #[must_use]
    pub fn member(&self, index: usize) -> Option<&Path> {
        index
            .checked_sub(1)
            .and_then(|i| self.paths.get(i))
            .map(PathBuf::as_path)
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Number of redundant copies (all members but one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes freed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// The member paths sorted lexicographically; the ordering key between sets.
    #[must_use]
    pub fn sorted_paths(&self) -> Vec<&Path> {
        let mut sorted: Vec<&Path> = self.paths.iter().map(PathBuf::as_path).collect();
        sorted.sort();
        sorted
    }

    /// Decide which member to keep. See [`resolve::resolve`].
    ///
    /// # Errors
    ///
    /// `InvalidChoiceError` when an explicit index is outside `1..=len`.
    pub fn resolve(&self, choice: Choice) -> Result<Resolution, InvalidChoiceError> {
        resolve::resolve(&self.paths, choice)
    }
}

/// Sort sets by their lexicographically sorted path lists.
pub fn sort_sets(sets: &mut [DuplicateSet]) {
    sets.sort_by(|a, b| a.sorted_paths().cmp(&b.sorted_paths()));
}
