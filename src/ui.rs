//! Styled terminal output helpers
//!
//! All human-readable diagnostics go through these helpers so the sync
//! engine itself stays free of formatting concerns.

use std::sync::atomic::{AtomicBool, Ordering};

use console::Style;

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable verbose output for the rest of the process (set once from the CLI).
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::Relaxed);
}

/// Whether verbose output is enabled.
pub fn verbose_enabled() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Print a normal status line.
pub fn status(message: &str) {
    println!("{}", message);
}

/// Print a highlighted success line.
pub fn success(message: &str) {
    println!("{} {}", Style::new().green().bold().apply_to("✓"), message);
}

/// Print a warning to stderr.
pub fn warn(message: &str) {
    eprintln!(
        "{} {}",
        Style::new().yellow().bold().apply_to("warning:"),
        message
    );
}

/// Print an error to stderr.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        Style::new().red().bold().apply_to("error:"),
        message
    );
}

/// Print a detail line, shown only with `--verbose`.
pub fn detail(message: &str) {
    if verbose_enabled() {
        println!("{}", Style::new().dim().apply_to(message));
    }
}
