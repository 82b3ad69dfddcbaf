//! # Troupe Observability
//!
//! Installs the global `tracing` subscriber described by a
//! [`TelemetryConfig`](troupe_core::TelemetryConfig).

use std::path::PathBuf;

pub mod trace;

pub use trace::{build_filter, filter_from_directives, init_tracing, open_log_file};

/// Observability framework errors
#[derive(thiserror::Error, Debug)]
pub enum ObservabilityError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}
