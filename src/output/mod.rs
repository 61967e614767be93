//! Output formatters for duplicate scan results.
//!
//! This module provides the non-interactive output formats:
//! - Text listing for `--dry-run`
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use tunedupe::duplicates::DuplicateFinder;
//! use tunedupe::error::ExitCode;
//! use tunedupe::output::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = JsonOutput::new(&sets, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::{JsonOutput, JsonOutputError};
pub use text::{write_sets, write_summary};
