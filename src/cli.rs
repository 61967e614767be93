//! Command-line interface definitions for `dedup`.
//!
//! This module defines all CLI arguments and options using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Interactively resolve duplicates under ~/Music
//! dedup ~/Music
//!
//! # List duplicate sets without touching anything
//! dedup ~/Music --dry-run
//!
//! # JSON report for scripting
//! dedup ~/Music --output json
//!
//! # Only FLAC files over 1 MiB, hashed on 4 threads
//! dedup ~/Music -e flac --min-size 1MiB --io-threads 4
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find byte-identical audio files and keep one copy of each.
///
/// Files under ROOT with a recognized audio extension are grouped by size,
/// then by BLAKE3 content digest. For every set of identical files you are
/// asked which one to keep; the others are deleted.
#[derive(Debug, Parser)]
#[command(name = "dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and prompts
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// File extension to consider (repeatable; replaces the default audio set)
    ///
    /// Given with or without the leading dot, matched case-insensitively.
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Number of threads used for hashing
    ///
    /// Values above 1 help on SSDs; keep 1 on spinning disks.
    #[arg(long, value_name = "N", default_value = "1")]
    pub io_threads: usize,

    /// Enable paranoid mode: byte-by-byte verification after digest match
    #[arg(long)]
    pub paranoid: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "interactive")]
    pub output: OutputFormat,

    /// List duplicate sets without prompting or deleting
    #[arg(long, conflicts_with = "yes")]
    pub dry_run: bool,

    /// Keep the shortest path of every set without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Move removed files to the system trash instead of deleting them
    #[arg(long)]
    pub trash: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// What to do with the duplicate sets once found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Prompt for each set and delete the copies not kept
    #[default]
    Interactive,
    /// Print a JSON report; never prompts or deletes
    Json,
}

/// Parse a human-readable size string into bytes.
///
/// Supports the following formats:
/// - Plain bytes: "1024", "1024B"
/// - Decimal units: "1KB", "1MB", "1GB", "1TB" (powers of 1000)
/// - Binary units: "1KiB", "1MiB", "1GiB", "1TiB" (powers of 1024)
///
/// Suffixes are case-insensitive. Fractional values are supported.
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or has an unknown suffix.
///
/// # Examples
///
/// ```
/// use tunedupe::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1.5MB").unwrap(), 1_500_000);
/// ```
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
