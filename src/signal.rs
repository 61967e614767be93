//! Ctrl+C handling.
//!
//! The first interrupt sets a shared `AtomicBool`; the scan and the
//! interactive session poll it and stop at the next safe point, so no
//! unconfirmed set is ever touched. A second interrupt exits immediately
//! with [`EXIT_CODE_INTERRUPTED`].
//!
//! ```rust,no_run
//! use tunedupe::signal::install_handler;
//! use tunedupe::duplicates::FinderConfig;
//!
//! let handler = install_handler().unwrap();
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (128 + 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown flag.
///
/// Cloning shares the flag.
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an interrupt has been received (or requested manually).
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Set the flag as if Ctrl+C had been pressed once.
    ///
    /// Returns `true` if shutdown had already been requested.
    pub fn request_shutdown(&self) -> bool {
        self.flag.swap(true, Ordering::SeqCst)
    }

    /// The flag to hand to `FinderConfig`, `Walker`, `Hasher` and `Session`.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// The `ctrlc` hook can only be registered once per process. Later calls
/// (repeated `run_app` calls in tests) get the already installed handler
/// back with its flag cleared.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if some other code already owns
/// the signal hook.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let hooked = handler.clone();

    ctrlc::set_handler(move || {
        if hooked.request_shutdown() {
            let _ = writeln!(std::io::stderr(), "\nInterrupted again, exiting.");
            std::process::exit(EXIT_CODE_INTERRUPTED);
        }

        let _ = writeln!(
            std::io::stderr(),
            "\nInterrupted. Finishing the current step (press Ctrl+C again to quit now)..."
        );
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    })?;

    Ok(GLOBAL_HANDLER.get_or_init(|| handler).clone())
}
