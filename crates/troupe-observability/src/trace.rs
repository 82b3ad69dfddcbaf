use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use troupe_core::{LogFormat, TelemetryConfig};

use crate::ObservabilityError;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`. Output goes to stderr, or
/// is appended to `log_file` without ANSI colours. Disabled telemetry
/// installs nothing.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), ObservabilityError> {
    if !config.enabled {
        return Ok(());
    }

    let filter = build_filter(config)?;
    let (writer, ansi) = match &config.log_file {
        Some(path) => (BoxMakeWriter::new(Arc::new(open_log_file(path)?)), false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(ansi),
            )
            .try_init(),
    };
    installed.map_err(|_| ObservabilityError::AlreadyInitialized)?;

    tracing::debug!(
        level = %config.log_level,
        format = ?config.format,
        file = ?config.log_file,
        "Initialized tracing"
    );
    Ok(())
}

/// Filter from `RUST_LOG`, falling back to the configured level.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, ObservabilityError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => filter_from_directives(&config.log_level),
    }
}

/// Parse filter directives such as `info` or `troupe_agent=debug,warn`.
pub fn filter_from_directives(directives: &str) -> Result<EnvFilter, ObservabilityError> {
    EnvFilter::try_new(directives).map_err(|e| ObservabilityError::InvalidFilter(e.to_string()))
}

/// Open `path` for appending, creating it and its parent directories.
pub fn open_log_file(path: &Path) -> Result<File, ObservabilityError> {
    let log_err = |source: std::io::Error| ObservabilityError::LogFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(log_err)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn parses_level_and_target_directives() {
        assert!(filter_from_directives("info").is_ok());
        assert!(filter_from_directives("troupe_agent=debug,warn").is_ok());
    }

    #[test]
    fn rejects_unknown_level() {
        let err = filter_from_directives("troupe_agent=loudest").unwrap_err();
        assert!(matches!(err, ObservabilityError::InvalidFilter(_)));
    }

    #[test]
    fn log_file_is_created_with_parents_and_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("troupe.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn disabled_telemetry_installs_nothing() {
        let config = TelemetryConfig {
            enabled: false,
            ..TelemetryConfig::default()
        };
        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }

    #[test]
    fn second_initialization_is_reported() {
        let config = TelemetryConfig::default();
        let _ = init_tracing(&config);
        assert!(matches!(
            init_tracing(&config),
            Err(ObservabilityError::AlreadyInitialized)
        ));
    }
}
