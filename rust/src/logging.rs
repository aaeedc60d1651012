//! Logging macros for the coverage engine with verbosity level control.
//!
//! Output goes to stderr and costs nothing when the level is disabled.
//! Verbosity levels:
//! - 0: SILENT (warnings only)
//! - 1: CHANGES (accepted combinations, per-slot results)
//! - 2: CHECKS (per-candidate verdicts)
//! - 3: DEBUG (per-minute failures, worker pool internals)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log a warning regardless of verbosity.
///
/// Used for: skipped input rows, duplicate teachers.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        eprintln!("warning: {}", format_args!($($arg)*))
    };
}

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: accepted combinations, slot summaries.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: rejected candidates and the reason they were rejected.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: the failing minute of a day check, pool sizing.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!($($arg)*);
        }
    };
}
