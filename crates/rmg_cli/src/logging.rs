use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, Once};

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to a file; used while the terminal UI owns the screen
    File(PathBuf),
    Off,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init_logging(target: LogTarget) -> anyhow::Result<()> {
    let file = match &target {
        LogTarget::File(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("Cannot open log file {}: {}", path.display(), e))?,
        ),
        LogTarget::Stderr | LogTarget::Off => None,
    };

    if target == LogTarget::Off || tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
        let _ = match file {
            Some(file) => builder.with_writer(Mutex::new(file)).with_ansi(false).try_init(),
            None => builder.with_writer(std::io::stderr).try_init(),
        };
    });
    Ok(())
}
