// A minimal logger for the `log` crate. Messages go to stderr with their
// level. Filtering by level is left to `log::set_max_level`, and only
// messages from this program and its search library are printed.

use log::{self, Log};

/// The log targets whose messages are printed.
const TARGETS: &[&str] = &["imdb_lookup", "imdb_keyscan"];

/// Initialize the stderr logger as the global logger.
pub fn init() -> anyhow::Result<()> {
    log::set_logger(LOGGER)?;
    Ok(())
}

#[derive(Debug)]
struct Logger(());

const LOGGER: &Logger = &Logger(());

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        should_log(metadata.target())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!("{}: {}", record.level(), record.args());
    }

    // eprintln! flushes on every call.
    fn flush(&self) {}
}

fn should_log(target: &str) -> bool {
    TARGETS.iter().any(|t| target.starts_with(t))
}
