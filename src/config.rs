//! Run configuration built from the command line.
//!
//! [`Config::from_cli`] validates the parsed arguments once and turns them
//! into the pieces the rest of the application consumes: a [`FinderConfig`],
//! a [`DeleteConfig`] and the [`RunMode`] that decides what happens to the
//! duplicate sets. There is no configuration file.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::actions::DeleteConfig;
use crate::cli::{Cli, OutputFormat};
use crate::duplicates::FinderConfig;
use crate::progress::ProgressCallback;
use crate::scanner::{ExtensionSet, WalkerConfig};

/// What happens once the duplicate sets are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Prompt for every set and delete the copies not kept.
    Interactive,
    /// Keep the default member of every set without prompting.
    AutoYes,
    /// List the sets and stop.
    DryRun,
    /// Print a JSON report and stop.
    Json,
}

impl RunMode {
    /// Whether this mode may remove files.
    #[must_use]
    pub fn deletes(self) -> bool {
        matches!(self, Self::Interactive | Self::AutoYes)
    }
}

/// Validated configuration for one run of `dedup`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory to scan.
    pub root: PathBuf,
    /// Traversal filters.
    pub walker_config: WalkerConfig,
    /// Hashing pool size, at least 1.
    pub io_threads: usize,
    /// Byte-for-byte confirmation after digest match.
    pub paranoid: bool,
    /// What to do with the sets.
    pub mode: RunMode,
    /// How removed files are disposed of.
    pub delete_config: DeleteConfig,
    /// Suppress progress and informational output.
    pub quiet: bool,
    /// Colour terminal output.
    pub color: bool,
}

impl Config {
    /// Validate the parsed arguments.
    ///
    /// # Errors
    ///
    /// Fails when `--min-size` exceeds `--max-size`, when `--io-threads` is 0,
    /// or when an `--extension` value is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use clap::Parser;
    /// use tunedupe::cli::Cli;
    /// use tunedupe::config::{Config, RunMode};
    ///
    /// let cli = Cli::parse_from(["dedup", "/music", "--dry-run"]);
    /// let config = Config::from_cli(&cli).unwrap();
    /// assert_eq!(config.mode, RunMode::DryRun);
    /// ```
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if let (Some(min), Some(max)) = (cli.min_size, cli.max_size) {
            if min > max {
                bail!("--min-size ({min} bytes) is larger than --max-size ({max} bytes)");
            }
        }
        if cli.io_threads == 0 {
            bail!("--io-threads must be at least 1");
        }

        let extensions = if cli.extensions.is_empty() {
            ExtensionSet::audio()
        } else {
            if cli
                .extensions
                .iter()
                .any(|e| e.trim().trim_start_matches('.').is_empty())
            {
                bail!("--extension values must not be empty");
            }
            ExtensionSet::new(cli.extensions.iter().map(String::as_str))
        };

        let walker_config = WalkerConfig::new(extensions)
            .with_skip_hidden(cli.skip_hidden)
            .with_min_size(cli.min_size)
            .with_max_size(cli.max_size);

        let mode = match cli.output {
            OutputFormat::Json => RunMode::Json,
            OutputFormat::Interactive if cli.dry_run => RunMode::DryRun,
            OutputFormat::Interactive if cli.yes => RunMode::AutoYes,
            OutputFormat::Interactive => RunMode::Interactive,
        };

        let delete_config = if cli.trash {
            DeleteConfig::trash()
        } else {
            DeleteConfig::permanent()
        };

        Ok(Self {
            root: cli.root.clone(),
            walker_config,
            io_threads: cli.io_threads,
            paranoid: cli.paranoid,
            mode,
            delete_config,
            quiet: cli.quiet,
            color: !cli.no_color,
        })
    }

    /// Whether progress bars should be drawn.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.mode != RunMode::Json
    }

    /// Build the finder configuration for this run.
    #[must_use]
    pub fn finder_config(
        &self,
        shutdown_flag: Arc<AtomicBool>,
        progress: Option<Arc<dyn ProgressCallback>>,
    ) -> FinderConfig {
        let mut config = FinderConfig::default()
            .with_walker_config(self.walker_config.clone())
            .with_io_threads(self.io_threads)
            .with_paranoid(self.paranoid)
            .with_shutdown_flag(shutdown_flag);
        if let Some(callback) = progress {
            config = config.with_progress_callback(callback);
        }
        config
    }
}
