//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag, with one
//! exception: the trust banner for skipped verification is always shown,
//! so reduced trust guarantees never pass silently.

use std::fmt::Display;

use colored::Colorize;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a progress message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("{} {}", "warning:".yellow(), message);
    }
}

/// Print the trust banner for a component whose verification is skipped.
///
/// Always shown, even in quiet mode, and visually distinct so operators
/// notice the reduced trust guarantee in scrolling build output.
pub fn trust_banner(component: impl Display) {
    let line = "!".repeat(64);
    eprintln!("{}", line.yellow().bold());
    eprintln!(
        "{}",
        format!("!!  signature verification DISABLED for component '{component}'")
            .yellow()
            .bold()
    );
    eprintln!("{}", line.yellow().bold());
}
