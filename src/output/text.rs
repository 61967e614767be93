//! Plain-text listing of duplicate sets.
//!
//! Used by `--dry-run`: each set gets a header line followed by the same
//! `[i]  path` listing the interactive prompt shows.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use crate::duplicates::{DuplicateSet, ScanSummary};

/// Number of hex characters of the digest shown in set headers.
const SHORT_DIGEST_LEN: usize = 12;

fn condition(color: bool) -> Condition {
    if color {
        Condition::ALWAYS
    } else {
        Condition::NEVER
    }
}

/// Write every set with a header and its numbered members.
///
/// # Errors
///
/// Returns any error from the writer.
///
/// # Example
///
/// ```
/// use tunedupe::duplicates::DuplicateSet;
/// use tunedupe::output::text::write_sets;
/// use std::path::PathBuf;
///
/// let set = DuplicateSet::new([0u8; 32], 10, vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]);
/// let mut out = Vec::new();
/// write_sets(&mut out, &[set], false).unwrap();
///
/// assert!(String::from_utf8(out).unwrap().contains("[2]  b.mp3"));
/// ```
pub fn write_sets<W: Write>(writer: &mut W, sets: &[DuplicateSet], color: bool) -> io::Result<()> {
    let when = condition(color);
    for (n, set) in sets.iter().enumerate() {
        let digest = set.digest_hex();
        let header = format!(
            "Set {}: {} files, {} each, blake3 {}",
            n + 1,
            set.len(),
            ByteSize::b(set.size),
            &digest[..SHORT_DIGEST_LEN]
        );
        writeln!(writer, "{}", header.bold().whenever(when))?;
        for (i, path) in set.paths.iter().enumerate() {
            let label = format!("[{}]", i + 1);
            writeln!(writer, "{}  {}", label.cyan().whenever(when), path.display())?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write a one-line scan summary.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &ScanSummary, color: bool) -> io::Result<()> {
    let line = if summary.duplicate_groups == 0 {
        format!(
            "No duplicates among {} candidate file(s) ({})",
            summary.total_files,
            summary.total_size_display()
        )
    } else {
        format!(
            "Found {} duplicate set(s), {} redundant file(s), {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        )
    };
    writeln!(writer, "{}", line.green().whenever(condition(color)))?;

    if !summary.scan_errors.is_empty() {
        let warning = format!("{} file(s) could not be read", summary.scan_errors.len());
        writeln!(writer, "{}", warning.yellow().whenever(condition(color)))?;
    }
    Ok(())
}
