//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more scenarios did not pass
    #[error("{failed} of {total} scenarios failed")]
    ScenarioFailures {
        /// Number of failing scenarios
        failed: usize,
        /// Number of scenarios run
        total: usize,
    },

    /// Feature compiled out
    #[error("{0} requires browser support; rebuild with --features browser")]
    BrowserUnavailable(&'static str),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// canvas-probe library error
    #[error(transparent)]
    Probe(#[from] canvas_probe::ProbeError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
