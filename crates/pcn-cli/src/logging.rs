use crate::error::{CliError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{Layer, Registry, filter::LevelFilter, fmt, prelude::*};

/// `-v` count to level; `--quiet` keeps errors only.
fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// A plain-text layer writing to `path`, truncating any previous log.
fn file_layer<S>(path: &Path) -> Result<impl Layer<S>>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    let file = File::create(path).map_err(|source| CliError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true))
}

/// Installs the global subscriber: compact stderr output plus an optional log file. Both
/// share the verbosity filter.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let file_layer = log_file
        .as_deref()
        .map(file_layer::<Registry>)
        .transpose()?;

    tracing_subscriber::registry()
        .with(
            stderr_layer
                .and_then(file_layer)
                .with_filter(level_filter(verbosity, quiet)),
        )
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing::{debug, info, trace, warn};

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(9, false), LevelFilter::TRACE);
        assert_eq!(level_filter(2, true), LevelFilter::ERROR);
    }

    #[test]
    #[serial]
    fn file_layer_records_events_with_thread_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pcn.log");
        let subscriber = tracing_subscriber::registry().with(file_layer(&path).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            info!(protein = "1abc", "Contact network built.");
            trace!("Eigengap candidates ranked.");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Contact network built."));
        assert!(content.contains("protein=\"1abc\""));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains('\u{1b}'));
    }

    #[test]
    #[serial]
    fn filter_drops_events_below_the_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered.log");
        let subscriber = tracing_subscriber::registry()
            .with(file_layer(&path).unwrap().with_filter(level_filter(0, false)));

        tracing::subscriber::with_default(subscriber, || {
            warn!("kept");
            debug!("dropped");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("kept"));
        assert!(!content.contains("dropped"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = setup_logging(0, false, Some(dir.path().to_path_buf()));
        assert!(matches!(result, Err(CliError::LogFile { path, .. }) if path == dir.path()));
    }
}
