// Logging setup.
// Routes tracing events to a file, since the TUI owns the terminal.

use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::cache::logs_dir;
use crate::error::{FolioError, Result};

const LOG_FILE: &str = "folio.log";

/// Parse a level name such as `info` or `DEBUG`.
pub fn parse_log_level(level: &str) -> Result<Level> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| FolioError::Config(format!("invalid log level '{}'", level)))
}

/// Install the global subscriber writing to `<cache>/logs/folio.log`.
///
/// `RUST_LOG` directives take precedence over `level`. Keep the returned
/// guard alive for as long as logs should be flushed.
pub fn init(cache_dir: &Path, level: &str) -> Result<WorkerGuard> {
    let default_level = parse_log_level(level)?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let dir = logs_dir(cache_dir);
    std::fs::create_dir_all(&dir)?;
    let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| FolioError::Config(format!("logger already initialized: {}", e)))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level(" warn ").unwrap(), Level::WARN);
        assert!(matches!(parse_log_level("loud"), Err(FolioError::Config(_))));
    }
}
