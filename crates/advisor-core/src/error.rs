//! Error types for stock-advisor operations

use thiserror::Error;

/// Errors raised while configuring or running an analysis
///
/// An analyzer that lacks data does not error; it returns an inapplicable
/// [`AnalysisResult`](crate::AnalysisResult). Zero applicable analyzers is
/// not an error either; the aggregator falls back to a neutral composite.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Snapshot is structurally unusable for the named analyzer
    #[error("Malformed input for {analyzer}: {reason}")]
    MalformedInput {
        analyzer: String,
        reason: String,
    },

    /// Invalid weight, threshold ordering or other configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    Indicator(String),

    /// Snapshot source could not produce data for a symbol
    #[error("Snapshot unavailable for {symbol}: {reason}")]
    Source {
        symbol: String,
        reason: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV rendering error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl AdvisorError {
    /// Shorthand for [`AdvisorError::MalformedInput`]
    pub fn malformed(analyzer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            analyzer: analyzer.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AdvisorError::Configuration`]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result type alias for stock-advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;
