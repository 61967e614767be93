//! Diagnostic logging for `dedup`.
//!
//! Log lines go to stderr through `env_logger`. Stdout belongs to the
//! prompt and the reports, so the default level is `warn`: a plain run
//! only shows unreadable files and refused sets. `-v` adds scan timings,
//! `-vv` per-set decisions, `-vvv` every hashed file. `--quiet` drops to
//! errors. A set `RUST_LOG` replaces all of this.
//!
//! ```rust,no_run
//! use tunedupe::logging::init_logging;
//!
//! init_logging(2, false);
//! log::debug!("shown with -vv");
//! ```

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Install the global logger for the given `-v` count and `--quiet` flag.
///
/// Returns `false` when a logger was already installed, in which case the
/// existing one is left alone.
pub fn init_logging(verbose: u8, quiet: bool) -> bool {
    let from_env = env::var("RUST_LOG").ok();
    let level = level_for(verbose, quiet);

    let mut builder = Builder::new();
    match &from_env {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(level);
        }
    }
    configure_format(&mut builder, cfg!(debug_assertions) && verbose >= 2);

    if builder.try_init().is_err() {
        return false;
    }

    match from_env {
        Some(filter) => log::debug!("Log filter from RUST_LOG: {}", filter),
        None => log::debug!("Log level {}", level),
    }
    true
}

/// `--quiet` wins over any number of `-v`.
fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

// Debug builds stamp every line; `detailed` adds the module path.
fn configure_format(builder: &mut Builder, detailed: bool) {
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);

        if cfg!(debug_assertions) {
            let timestamp = buf.timestamp_seconds();
            write!(buf, "{} ", timestamp)?;
        }
        write!(buf, "{style}{:<5}{style:#} ", level)?;
        if detailed {
            write!(buf, "[{}] ", record.module_path().unwrap_or("?"))?;
        }
        writeln!(buf, "{}", record.args())
    });
}
