#![deny(missing_docs)]
//! Logging for the catalog crates.
//!
//! The `catalog_*` macros forward to the `log` facade, so the binary picks the
//! sink. Each dispatch thread also records the fetch attempt it is applying,
//! letting log lines name the attempt without threading it through every call.

use std::cell::Cell;

thread_local! {
    /// Fetch attempt currently being processed by this thread's dispatch loop.
    static CURRENT_ATTEMPT: Cell<u64> = const { Cell::new(0) };
}

/// Records the fetch attempt the calling thread is working on.
/// The dispatch loop calls this whenever it applies a message.
pub fn set_current_attempt(attempt_id: u64) {
    CURRENT_ATTEMPT.with(|v| v.set(attempt_id));
}

/// Returns the fetch attempt recorded for the calling thread, or 0 if none.
pub fn current_attempt() -> u64 {
    CURRENT_ATTEMPT.with(|v| v.get())
}

/// Trace-level detail, such as per-record normalization decisions.
#[macro_export]
macro_rules! catalog_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Fetch attempts issued and page transitions (ready, empty).
#[macro_export]
macro_rules! catalog_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Stale completions discarded, bytes loaded per attempt.
#[macro_export]
macro_rules! catalog_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Failed fetches, parse failures and dropped feed records.
#[macro_export]
macro_rules! catalog_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Failures the page cannot recover from, e.g. a dead fetch engine.
#[macro_export]
macro_rules! catalog_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
