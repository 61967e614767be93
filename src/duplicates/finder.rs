//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: enumerate candidate files with a recognized extension
//! 2. **Size grouping**: drop files whose size is unique (see [`crate::duplicates::groups`])
//! 3. **Digest grouping**: hash the survivors with BLAKE3 and drop unique digests
//! 4. **Paranoid check** (optional): confirm each digest group byte for byte
//!
//! # Example
//!
//! ```no_run
//! use tunedupe::duplicates::{group_by_digest, group_by_size, retain_duplicates};
//! use tunedupe::scanner::{enumerate_candidates, ExtensionSet, Hasher};
//! use std::path::Path;
//!
//! let candidates = enumerate_candidates(Path::new("/music"), &ExtensionSet::audio())
//!     .unwrap()
//!     .filter_map(Result::ok);
//! let (mut by_size, _) = group_by_size(candidates);
//! retain_duplicates(&mut by_size);
//!
//! for paths in by_size.into_values() {
//!     let (by_digest, stats) = group_by_digest(paths, &Hasher::new());
//!     println!("{} digests, {} read failures", by_digest.len(), stats.failed_files);
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{
    group_entries_by_size, partition_by, retain_duplicates, sort_sets, DuplicateSet,
};
use crate::progress::ProgressCallback;
use crate::scanner::{
    files_identical, ExtensionSet, FileEntry, Hash, HashError, Hasher, ScanError, Walker,
    WalkerConfig,
};

/// Size above which a file being hashed is logged at debug level.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Statistics from a digest grouping pass.
#[derive(Debug, Default)]
pub struct DigestStats {
    /// Number of paths offered for hashing
    pub input_files: usize,
    /// Number of files hashed successfully
    pub hashed_files: usize,
    /// Number of files that could not be read
    pub failed_files: usize,
    /// Whether hashing stopped because shutdown was requested
    pub interrupted: bool,
    /// Per-file read failures
    pub errors: Vec<HashError>,
}

impl DigestStats {
    fn merge(&mut self, other: DigestStats) {
        self.input_files += other.input_files;
        self.hashed_files += other.hashed_files;
        self.failed_files += other.failed_files;
        self.interrupted |= other.interrupted;
        self.errors.extend(other.errors);
    }
}

/// Group paths by the BLAKE3 digest of their full contents.
///
/// A file that cannot be read is excluded and recorded in
/// [`DigestStats::errors`]. Members keep input order. Singleton groups are
/// kept; see [`retain_duplicates`].
pub fn group_by_digest<I>(paths: I, hasher: &Hasher) -> (BTreeMap<Hash, Vec<PathBuf>>, DigestStats)
where
    I: IntoIterator<Item = PathBuf>,
{
    let paths: Vec<PathBuf> = paths.into_iter().collect();
    let digests = hash_all(&paths, hasher, None, None);
    collect_digests(paths, digests)
}

/// Hash every path, in parallel when a pool is given.
///
/// Results are returned in input order regardless of completion order.
fn hash_all(
    paths: &[PathBuf],
    hasher: &Hasher,
    pool: Option<&rayon::ThreadPool>,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Vec<Result<Hash, HashError>> {
    // Completion count, not input position: workers finish out of order.
    let done = AtomicUsize::new(0);
    let hash_one = |path: &PathBuf| {
        if let Some(callback) = progress {
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            callback.on_progress(current, path.to_string_lossy().as_ref());
        }
        let result = hasher.full_hash(path);
        match &result {
            Ok(_) => log::trace!("Hashed {}", path.display()),
            Err(HashError::Interrupted(_)) => {}
            Err(e) => log::warn!("Failed to hash {}: {}", path.display(), e),
        }
        result
    };

    match pool {
        Some(pool) => pool.install(|| paths.par_iter().map(hash_one).collect()),
        None => paths.iter().map(hash_one).collect(),
    }
}

fn collect_digests(
    paths: Vec<PathBuf>,
    digests: Vec<Result<Hash, HashError>>,
) -> (BTreeMap<Hash, Vec<PathBuf>>, DigestStats) {
    let mut stats = DigestStats {
        input_files: paths.len(),
        ..Default::default()
    };

    let hashed: Vec<(Hash, PathBuf)> = paths
        .into_iter()
        .zip(digests)
        .filter_map(|(path, digest)| match digest {
            Ok(digest) => {
                stats.hashed_files += 1;
                Some((digest, path))
            }
            Err(HashError::Interrupted(_)) => {
                stats.interrupted = true;
                None
            }
            Err(e) => {
                stats.failed_files += 1;
                stats.errors.push(e);
                None
            }
        })
        .collect();

    let groups = partition_by(hashed, |(digest, _)| *digest)
        .into_iter()
        .map(|(digest, members)| (digest, members.into_iter().map(|(_, p)| p).collect()))
        .collect();

    (groups, stats)
}

/// Split a digest group into classes of byte-identical files.
///
/// Files that cannot be read during the comparison are dropped and their
/// errors returned. A class whose first member turns unreadable loses only
/// that member; the file being placed is compared against the next one.
fn split_identical(paths: Vec<PathBuf>) -> (Vec<Vec<PathBuf>>, Vec<HashError>) {
    let mut classes: Vec<Vec<PathBuf>> = Vec::new();
    let mut errors = Vec::new();

    'next: for path in paths {
        let mut i = 0;
        while i < classes.len() {
            match files_identical(&classes[i][0], &path) {
                Ok(true) => {
                    classes[i].push(path);
                    continue 'next;
                }
                Ok(false) => i += 1,
                Err(e) => {
                    log::warn!("Paranoid comparison failed: {}", e);
                    let head_failed = e.path() == classes[i][0].as_path();
                    errors.push(e);
                    if !head_failed {
                        continue 'next;
                    }
                    classes[i].remove(0);
                    if classes[i].is_empty() {
                        classes.remove(i);
                    }
                }
            }
        }
        classes.push(vec![path]);
    }

    if classes.len() > 1 {
        log::warn!(
            "Digest collision: group split into {} byte-identical classes",
            classes.len()
        );
    }
    (classes, errors)
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Number of threads used for hashing. Default is 1.
    pub io_threads: usize,
    /// Enable byte-by-byte verification after digest matching.
    pub paranoid: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("io_threads", &self.io_threads)
            .field("paranoid", &self.paranoid)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            io_threads: 1,
            paranoid: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable paranoid mode (byte-by-byte verification).
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Number of candidate files found
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Number of candidates eliminated because their size is unique
    pub eliminated_by_size: usize,
    /// Number of files whose contents were hashed
    pub hashed_files: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_groups: usize,
    /// Number of redundant files (excluding one kept copy per set)
    pub duplicate_files: usize,
    /// Bytes freed by keeping one copy of every set
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Non-fatal errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of scanned bytes taken up by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Any other scan error on the root.
    #[error(transparent)]
    ScanError(ScanError),
}

impl From<ScanError> for FinderError {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::NotFound(path) => Self::PathNotFound(path),
            ScanError::NotADirectory(path) => Self::NotADirectory(path),
            ScanError::Io { path, source } => Self::Io { path, source },
            other => Self::ScanError(other),
        }
    }
}

/// Duplicate finder that runs the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use tunedupe::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
/// let (sets, summary) = finder.find_duplicates(Path::new("/music")).unwrap();
///
/// println!("Found {} duplicate sets", sets.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate sets under `path`.
    ///
    /// Sets are ordered by their sorted path lists and each set's members
    /// are ordered shortest path first. Per-file failures are collected in
    /// [`ScanSummary::scan_errors`] and never abort the scan.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The scan is interrupted by the shutdown flag
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        walker.validate_root()?;

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Walk
        let callback = self.config.progress_callback.as_ref();
        if let Some(callback) = callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", path.display()));
        }

        let mut files: Vec<FileEntry> = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(callback) = callback {
                        callback.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    files.push(file);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    summary.scan_errors.push(e);
                }
            }
        }

        if let Some(callback) = callback {
            callback.on_phase_end("walking");
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Size grouping
        let (mut size_groups, size_stats) = group_entries_by_size(files);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = retain_duplicates(&mut size_groups);

        log::info!(
            "Found {} candidates ({}), {} share their size",
            summary.total_files,
            summary.total_size_display(),
            size_stats.potential_duplicates
        );

        // Digest grouping
        let digest_groups = self.hash_size_groups(size_groups, &mut summary)?;

        // Paranoid confirmation
        let mut sets = Vec::new();
        for (size, digest, paths) in digest_groups {
            let classes = if self.config.paranoid {
                let (classes, errors) = split_identical(paths);
                summary
                    .scan_errors
                    .extend(errors.into_iter().map(ScanError::from));
                classes
            } else {
                vec![paths]
            };

            for class in classes.into_iter().filter(|c| c.len() > 1) {
                log::debug!(
                    "Duplicate set {}: {} files, {} bytes each",
                    crate::scanner::hash_to_hex(&digest),
                    class.len(),
                    size
                );
                sets.push(DuplicateSet::new(digest, size, class));
            }
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        sort_sets(&mut sets);

        summary.duplicate_groups = sets.len();
        summary.duplicate_files = sets.iter().map(DuplicateSet::duplicate_count).sum();
        summary.reclaimable_space = sets.iter().map(DuplicateSet::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate sets, {} redundant files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((sets, summary))
    }

    /// Hash every surviving size group and keep digests shared by 2+ files.
    fn hash_size_groups(
        &self,
        size_groups: BTreeMap<u64, Vec<PathBuf>>,
        summary: &mut ScanSummary,
    ) -> Result<Vec<(u64, Hash, Vec<PathBuf>)>, FinderError> {
        let to_hash: Vec<PathBuf> = size_groups.values().flatten().cloned().collect();
        if to_hash.is_empty() {
            return Ok(Vec::new());
        }

        let callback = self.config.progress_callback.as_ref();
        if let Some(callback) = callback {
            callback.on_phase_start("hashing", to_hash.len());
        }
        log::info!("Hashing {} files", to_hash.len());

        for (size, paths) in &size_groups {
            if *size > LARGE_FILE_THRESHOLD {
                for path in paths {
                    log::debug!(
                        "Hashing large file ({} MB): {}",
                        size / (1024 * 1024),
                        path.display()
                    );
                }
            }
        }

        let pool = self.build_pool();
        let mut digests = hash_all(&to_hash, &self.hasher, pool.as_ref(), callback).into_iter();

        if let Some(callback) = callback {
            callback.on_phase_end("hashing");
        }

        let mut stats = DigestStats::default();
        let mut groups = Vec::new();
        for (size, paths) in size_groups {
            let results: Vec<_> = digests.by_ref().take(paths.len()).collect();
            let (mut by_digest, group_stats) = collect_digests(paths, results);
            stats.merge(group_stats);
            retain_duplicates(&mut by_digest);
            groups.extend(
                by_digest
                    .into_iter()
                    .map(|(digest, members)| (size, digest, members)),
            );
        }

        summary.hashed_files = stats.hashed_files;
        summary
            .scan_errors
            .extend(stats.errors.into_iter().map(ScanError::from));

        if stats.interrupted || self.config.is_shutdown_requested() {
            log::info!("Hashing interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        Ok(groups)
    }

    /// A dedicated rayon pool for more than one hashing thread.
    fn build_pool(&self) -> Option<rayon::ThreadPool> {
        if self.config.io_threads <= 1 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("Failed to create hashing thread pool, hashing sequentially: {}", e);
                None
            }
        }
    }
}

/// Find every duplicate set of files under `root` whose extension is in `extensions`.
///
/// # Errors
///
/// `FinderError::PathNotFound` or `FinderError::NotADirectory` when the root
/// is unusable.
///
/// # Example
///
/// ```no_run
/// use tunedupe::duplicates::find_duplicate_sets;
/// use tunedupe::scanner::ExtensionSet;
/// use std::path::Path;
///
/// for set in find_duplicate_sets(Path::new("/music"), &ExtensionSet::audio()).unwrap() {
///     println!("{:?}", set.paths);
/// }
/// ```
pub fn find_duplicate_sets(
    root: &Path,
    extensions: &ExtensionSet,
) -> Result<Vec<DuplicateSet>, FinderError> {
    let config =
        FinderConfig::default().with_walker_config(WalkerConfig::new(extensions.clone()));
    DuplicateFinder::new(config)
        .find_duplicates(root)
        .map(|(sets, _)| sets)
}
