//! tunedupe - duplicate audio file finder
//!
//! Finds byte-identical audio files under a directory (size grouping, then
//! BLAKE3 digests) and walks the user through keeping one copy of each.
//! The `dedup` binary is a thin wrapper around [`run_app`].

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use yansi::{Condition, Paint};

use crate::cli::Cli;
use crate::config::{Config, RunMode};
use crate::duplicates::{DuplicateFinder, DuplicateSet, FinderError, ScanSummary};
use crate::error::ExitCode;
use crate::interactive::{Session, SessionSummary};
use crate::output::JsonOutput;
use crate::progress::{Progress, ProgressCallback};
use crate::signal::ShutdownHandler;

/// Run one invocation of `dedup`.
///
/// Returns the exit code for a completed or interrupted run. Fatal errors
/// (unusable root, invalid options, terminal I/O failures) are returned as
/// `Err` and map to [`ExitCode::GeneralError`].
///
/// # Errors
///
/// See above.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_cli(&cli)?;
    log::debug!("Run configuration: {:?}", config);

    let handler = signal::install_handler().unwrap_or_else(|e| {
        log::warn!("{}; Ctrl+C will terminate immediately", e);
        ShutdownHandler::new()
    });

    let progress = config.show_progress().then(|| Arc::new(Progress::new(false)));
    let callback = progress
        .as_ref()
        .map(|p| Arc::clone(p) as Arc<dyn ProgressCallback>);

    let finder = DuplicateFinder::new(config.finder_config(handler.get_flag(), callback));
    let scan = finder.find_duplicates(&config.root);
    if let Some(progress) = &progress {
        progress.clear();
    }

    let (sets, summary) = match scan {
        Ok(found) => found,
        Err(FinderError::Interrupted) => {
            log::info!("Scan interrupted, nothing was deleted");
            if !config.quiet {
                eprintln!("Scan interrupted, nothing was deleted");
            }
            return Ok(ExitCode::Interrupted);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("cannot scan {}", config.root.display()))
        }
    };

    log::info!(
        "Scan finished in {:?}: {} candidate(s), {} set(s)",
        summary.scan_duration,
        summary.total_files,
        summary.duplicate_groups
    );

    let stdout = io::stdout();
    let color = config.color && stdout.is_terminal();

    match config.mode {
        RunMode::Json => {
            let output = JsonOutput::new(&sets, &summary, ExitCode::Success);
            output
                .write_to(&mut stdout.lock(), true)
                .context("failed to write JSON report")?;
            Ok(ExitCode::Success)
        }
        RunMode::DryRun => {
            let mut out = stdout.lock();
            output::write_sets(&mut out, &sets, color)?;
            output::write_summary(&mut out, &summary, color)?;
            Ok(ExitCode::Success)
        }
        RunMode::Interactive | RunMode::AutoYes => {
            if sets.is_empty() {
                output::write_summary(&mut stdout.lock(), &summary, color)?;
                return Ok(ExitCode::Success);
            }
            if !config.quiet {
                output::write_summary(&mut io::stderr(), &summary, false)?;
            }

            let stdin = io::stdin();
            let mut session = Session::new(stdin.lock(), stdout.lock(), config.delete_config.clone())
                .with_shutdown_flag(handler.get_flag())
                .with_color(color);
            let session_summary = resolve_sets(&mut session, &sets, config.mode)?;
            let (_, mut out) = session.into_inner();
            write_session_summary(&mut out, &session_summary, &summary, color)?;

            if session_summary.interrupted {
                Ok(ExitCode::Interrupted)
            } else {
                Ok(ExitCode::Success)
            }
        }
    }
}

fn resolve_sets<R: io::BufRead, W: Write>(
    session: &mut Session<R, W>,
    sets: &[DuplicateSet],
    mode: RunMode,
) -> Result<SessionSummary> {
    let summary = if mode == RunMode::AutoYes {
        session.auto_resolve(sets)
    } else {
        session.run(sets)
    };
    summary.context("terminal I/O failed")
}

fn write_session_summary<W: Write>(
    out: &mut W,
    session: &SessionSummary,
    scan: &ScanSummary,
    color: bool,
) -> io::Result<()> {
    let when = if color {
        Condition::ALWAYS
    } else {
        Condition::NEVER
    };
    writeln!(out, "{}", session.to_string().bold().whenever(when))?;
    if !scan.scan_errors.is_empty() {
        let warning = format!(
            "{} file(s) could not be read and were not considered",
            scan.scan_errors.len()
        );
        writeln!(out, "{}", warning.yellow().whenever(when))?;
    }
    Ok(())
}
