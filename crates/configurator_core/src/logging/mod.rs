//! Logging setup for the configurator.
//!
//! All modules log through the `tracing` macros:
//! - `debug` for per-entry diagnostics and applied edits
//! - `info` for files reconciled and written
//! - `warn` for unreadable files and values that fail to decode
//! - `error` for failed saves
//!
//! Hosts that do not install their own subscriber can call [`init_tracing`].

mod types;

pub use types::LogLevel;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` directives apply first; anything they do not cover logs at
/// `default_level`. Output goes to stderr. Returns `false` if a subscriber
/// was already installed, in which case nothing changes.
pub fn init_tracing(default_level: LogLevel) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(level_filter(default_level).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .is_ok()
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn level_filter(level: LogLevel) -> LevelFilter {
    LevelFilter::from_level(level.to_tracing_level())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_becomes_filter() {
        assert_eq!(level_filter(LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(level_filter(LogLevel::Warn), LevelFilter::WARN);
        assert!(level_filter(LogLevel::Error) < level_filter(LogLevel::Info));
    }
}
