//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Generic ordered partitioning shared by both grouping stages
//! - Size-based file grouping
//! - Digest-based grouping and the full detection pipeline
//! - Duplicate set ordering

pub mod finder;
pub mod groups;

pub use finder::{
    find_duplicate_sets, group_by_digest, DigestStats, DuplicateFinder, FinderConfig, FinderError,
    ScanSummary,
};
pub use groups::{
    group_by_size, group_entries_by_size, partition_by, retain_duplicates, sort_sets,
    sort_shortest_first, DuplicateSet, GroupingStats,
};
