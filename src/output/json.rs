//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "files": ["/music/a/track.mp3", "/music/b/track.mp3"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "eliminated_by_size": 80,
//!     "hashed_files": 20,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "errors": 0,
//!     "exit_code": 0,
//!     "exit_code_name": "DD000"
//!   }
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tunedupe::duplicates::DuplicateFinder;
//! use tunedupe::error::ExitCode;
//! use tunedupe::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let (sets, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("/music"))
//!     .unwrap();
//!
//! let output = JsonOutput::new(&sets, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::duplicates::{DuplicateSet, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Absolute paths to all members, shortest first
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON group from a duplicate set.
    ///
    /// Paths are converted to absolute paths where possible.
    #[must_use]
    pub fn from_set(set: &DuplicateSet) -> Self {
        Self {
            hash: set.digest_hex(),
            size: set.size,
            files: set.paths.iter().map(|p| normalize_path(p)).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of candidates scanned
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Candidates dropped because their size is unique
    pub eliminated_by_size: usize,
    /// Files whose contents were hashed
    pub hashed_files: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_groups: usize,
    /// Total number of redundant files (excluding one kept copy per set)
    pub duplicate_files: usize,
    /// Bytes freed by keeping one copy of every set
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Number of non-fatal errors during the scan
    pub errors: usize,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            hashed_files: summary.hashed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            errors: summary.scan_errors.len(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate sets
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate sets, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use tunedupe::duplicates::{DuplicateSet, ScanSummary};
    /// use tunedupe::error::ExitCode;
    /// use tunedupe::output::json::JsonOutput;
    /// use std::path::PathBuf;
    ///
    /// let sets = vec![DuplicateSet::new(
    ///     [0u8; 32],
    ///     1024,
    ///     vec![PathBuf::from("/a.mp3"), PathBuf::from("/b.mp3")],
    /// )];
    ///
    /// let output = JsonOutput::new(&sets, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// ```
    #[must_use]
    pub fn new(sets: &[DuplicateSet], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: sets.iter().map(JsonDuplicateGroup::from_set).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Canonicalize a path for output, falling back to its display form.
fn normalize_path(path: &Path) -> String {
    match path.canonicalize() {
        Ok(canonical) => canonical.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
