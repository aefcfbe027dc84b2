//! Logging configuration for wordsieve.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (or to an embedding application) through [`init_logging`].

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log target of events emitted by the `wsieve` binary.
const BIN_TARGET: &str = "wsieve";

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Warnings and above. Filtered text goes to stdout, so this is the default.
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Initialize the logging system.
///
/// Should be called once at startup. `RUST_LOG` takes precedence over
/// `verbosity` when set. Events are written to stderr so they never mix
/// with redacted output on stdout.
///
/// # Examples
///
/// ```no_run
/// use wordsieve::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // Install the subscriber (ignore error if already set)
    let _ = subscriber.try_init();
}

/// Filter used when `RUST_LOG` is unset, covering the library and the
/// `wsieve` binary.
fn default_filter(verbosity: Verbosity) -> String {
    let level = verbosity.to_level_filter();
    format!("{}={level},{BIN_TARGET}={level}", env!("CARGO_CRATE_NAME"))
}

/// Initialize logging for tests.
///
/// Only warnings and errors are shown to keep test output clean.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::WARN);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_default_filter_covers_binary() {
        assert_eq!(default_filter(Verbosity::Normal), "wordsieve=WARN,wsieve=WARN");
        assert_eq!(
            default_filter(Verbosity::Verbose),
            "wordsieve=DEBUG,wsieve=DEBUG"
        );

        let filter = EnvFilter::new(default_filter(Verbosity::Normal));
        assert_eq!(
            filter.max_level_hint(),
            Some(tracing::level_filters::LevelFilter::WARN)
        );
    }

    #[test]
    fn test_verbosity_default() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_init_logging_with_all_verbosity_levels() {
        // Only the first call installs a subscriber; the rest must not panic.
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Verbose);
        init_logging(Verbosity::Trace);
    }

    #[test]
    fn test_init_test_logging_does_not_panic() {
        init_test_logging();
    }
}
