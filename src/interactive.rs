//! Terminal prompt that walks the user through each duplicate set.
//!
//! [`Session`] is a thin adapter: it lists a set, reads one decision per
//! line, and hands the decision to [`resolve`](crate::actions::resolve) and
//! [`delete_resolution`]. It works over any `BufRead`/`Write` pair, so the
//! binary drives it with stdin/stdout and tests with byte buffers.
//!
//! # Example
//!
//! ```no_run
//! use tunedupe::actions::DeleteConfig;
//! use tunedupe::duplicates::find_duplicate_sets;
//! use tunedupe::interactive::Session;
//! use tunedupe::scanner::ExtensionSet;
//! use std::path::Path;
//!
//! let sets = find_duplicate_sets(Path::new("/music"), &ExtensionSet::audio()).unwrap();
//! let stdin = std::io::stdin();
//! let mut session = Session::new(stdin.lock(), std::io::stdout(), DeleteConfig::permanent());
//! let summary = session.run(&sets).unwrap();
//! println!("{}", summary);
//! ```

use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use crate::actions::{delete_resolution, BatchDeleteResult, Choice, DeleteConfig, Resolution};
use crate::duplicates::DuplicateSet;

/// Prompt shown for every set; the bracketed default is member 1.
pub const PROMPT: &str = "Which one would you like to keep? [1] ";

/// One parsed line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the given member and remove the rest.
    Keep(Choice),
    /// Leave the set untouched.
    Skip,
    /// Stop; this and all remaining sets are left untouched.
    Quit,
}

/// Parse a line of input. Blank input keeps member 1.
///
/// Returns `None` for anything unrecognized. Range checking is left to
/// [`resolve`](crate::actions::resolve::resolve).
///
/// ```
/// use tunedupe::actions::Choice;
/// use tunedupe::interactive::{parse_decision, Decision};
///
/// assert_eq!(parse_decision(""), Some(Decision::Keep(Choice::Index(1))));
/// assert_eq!(parse_decision(" 2 \n"), Some(Decision::Keep(Choice::Index(2))));
/// assert_eq!(parse_decision("s"), Some(Decision::Skip));
/// assert_eq!(parse_decision("two"), None);
/// ```
#[must_use]
pub fn parse_decision(line: &str) -> Option<Decision> {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => Some(Decision::Keep(Choice::Index(1))),
        "s" | "skip" => Some(Decision::Skip),
        "q" | "quit" => Some(Decision::Quit),
        other => other.parse().ok().map(|k| Decision::Keep(Choice::Index(k))),
    }
}

/// A validated answer for one set.
enum Answer {
    Keep(Resolution),
    Skip,
    Quit,
    /// Ctrl+C arrived while waiting for the answer
    Interrupted,
}

/// Totals for one interactive or automatic run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Sets where a member was kept and removal was attempted
    pub resolved: usize,
    /// Sets the user skipped
    pub skipped: usize,
    /// Sets never reached (quit, end of input, or interrupt)
    pub untouched: usize,
    /// Sets left alone because removal was refused (kept file missing)
    pub refused: usize,
    /// Files removed
    pub removed_files: usize,
    /// Files whose removal failed
    pub failed_files: usize,
    /// Bytes freed
    pub bytes_freed: u64,
    /// Whether the session stopped on the shutdown flag
    pub interrupted: bool,
}

impl SessionSummary {
    fn record(&mut self, result: &BatchDeleteResult) {
        self.resolved += 1;
        self.removed_files += result.success_count();
        self.failed_files += result.failure_count();
        self.bytes_freed += result.bytes_freed;
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} set(s) resolved, {} skipped, {} untouched; removed {} file(s), freed {}",
            self.resolved,
            self.skipped,
            self.untouched + self.refused,
            self.removed_files,
            ByteSize::b(self.bytes_freed)
        )?;
        if self.failed_files > 0 {
            write!(f, ", {} failed", self.failed_files)?;
        }
        Ok(())
    }
}

/// Interactive resolution over an input/output pair.
pub struct Session<R, W> {
    input: R,
    output: W,
    delete_config: DeleteConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    color: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Create a session that removes files according to `delete_config`.
    pub fn new(input: R, output: W, delete_config: DeleteConfig) -> Self {
        Self {
            input,
            output,
            delete_config,
            shutdown_flag: None,
            color: false,
        }
    }

    /// Stop before the next set once this flag is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Colour the listing and summaries.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Consume the session, returning its input and output.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn when(&self) -> Condition {
        if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        }
    }

    /// Prompt for every set in order.
    ///
    /// # Errors
    ///
    /// Only terminal I/O errors are returned; deletion failures are reported
    /// on the output and counted in the summary.
    pub fn run(&mut self, sets: &[DuplicateSet]) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        for (position, set) in sets.iter().enumerate() {
            if self.is_shutdown_requested() {
                log::info!("Interrupted, leaving {} set(s) untouched", sets.len() - position);
                summary.interrupted = true;
                summary.untouched += sets.len() - position;
                break;
            }

            self.write_listing(set)?;
            match self.ask(set)? {
                Answer::Keep(resolution) => self.apply(&resolution, &mut summary)?,
                Answer::Skip => {
                    log::debug!("Skipped set {}", set.digest_hex());
                    summary.skipped += 1;
                    writeln!(self.output)?;
                }
                Answer::Quit => {
                    summary.untouched += sets.len() - position;
                    break;
                }
                Answer::Interrupted => {
                    log::info!(
                        "Interrupted at prompt, leaving {} set(s) untouched",
                        sets.len() - position
                    );
                    writeln!(self.output)?;
                    summary.interrupted = true;
                    summary.untouched += sets.len() - position;
                    break;
                }
            }
        }

        Ok(summary)
    }

    /// Keep the default member of every set without prompting.
    ///
    /// # Errors
    ///
    /// Only errors writing to the output are returned.
    pub fn auto_resolve(&mut self, sets: &[DuplicateSet]) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        for (position, set) in sets.iter().enumerate() {
            if self.is_shutdown_requested() {
                summary.interrupted = true;
                summary.untouched += sets.len() - position;
                break;
            }

            self.write_listing(set)?;
            match set.resolve(Choice::Default) {
                Ok(resolution) => self.apply(&resolution, &mut summary)?,
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    summary.refused += 1;
                }
            }
        }

        Ok(summary)
    }

    fn write_listing(&mut self, set: &DuplicateSet) -> io::Result<()> {
        let when = self.when();
        for (i, path) in set.paths.iter().enumerate() {
            let label = format!("[{}]", i + 1);
            writeln!(
                self.output,
                "{}  {}",
                label.cyan().whenever(when),
                path.display()
            )?;
        }
        Ok(())
    }

    /// Read decisions until one is valid.
    fn ask(&mut self, set: &DuplicateSet) -> io::Result<Answer> {
        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;

            let mut line = String::new();
            let read = self.input.read_line(&mut line)?;
            // the flag may have been set while blocked in read_line
            if self.is_shutdown_requested() {
                return Ok(Answer::Interrupted);
            }
            if read == 0 {
                writeln!(self.output)?;
                return Ok(Answer::Quit);
            }

            match parse_decision(&line) {
                Some(Decision::Keep(choice)) => match set.resolve(choice) {
                    Ok(resolution) => return Ok(Answer::Keep(resolution)),
                    Err(e) => {
                        let when = self.when();
                        writeln!(self.output, "{}", e.to_string().yellow().whenever(when))?;
                    }
                },
                Some(Decision::Skip) => return Ok(Answer::Skip),
                Some(Decision::Quit) => return Ok(Answer::Quit),
                None => {
                    let when = self.when();
                    let hint = format!(
                        "enter a number between 1 and {}, 's' to skip or 'q' to quit",
                        set.len()
                    );
                    writeln!(self.output, "{}", hint.yellow().whenever(when))?;
                }
            }
        }
    }

    fn apply(&mut self, resolution: &Resolution, summary: &mut SessionSummary) -> io::Result<()> {
        let when = self.when();
        let removing = resolution
            .remove
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(self.output, "Removing {}", removing)?;

        match delete_resolution(resolution, &self.delete_config) {
            Ok(result) => {
                summary.record(&result);
                let line = result.summary();
                if result.all_succeeded() {
                    writeln!(self.output, "{}", line.green().whenever(when))?;
                } else {
                    writeln!(self.output, "{}", line.red().whenever(when))?;
                    for (path, message) in &result.failures {
                        writeln!(self.output, "  failed: {}: {}", path.display(), message)?;
                    }
                }
            }
            Err(e) => {
                log::warn!("Refusing to resolve set: {}", e);
                summary.refused += 1;
                writeln!(
                    self.output,
                    "{}",
                    format!("Left untouched: {}", e).red().whenever(when)
                )?;
            }
        }
        writeln!(self.output)
    }
}
