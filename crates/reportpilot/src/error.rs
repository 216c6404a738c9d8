//! Error types for the ReportPilot library.

use thiserror::Error;

/// Main error type for pipeline operations.
///
/// Only structural problems are errors. Bad cell data never is: it degrades
/// to [`Value::Missing`](crate::Value::Missing) and is reported through the
/// diagnostics sink instead.
#[derive(Debug, Error)]
pub enum ReportError {
    /// One or more structurally required columns are absent.
    #[error("Schema error: missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// The table itself is malformed (duplicate names, ragged rows).
    #[error("Schema error: {0}")]
    Schema(String),

    /// A configuration value is structurally invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration text could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Create a missing-columns error from any list of names.
    pub fn missing_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReportError::MissingColumns {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true for the schema class of errors.
    pub fn is_schema(&self) -> bool {
        matches!(self, ReportError::MissingColumns { .. } | ReportError::Schema(_))
    }

    /// Returns true for the configuration class of errors.
    pub fn is_config(&self) -> bool {
        matches!(self, ReportError::Config(_) | ReportError::Json(_))
    }
}

/// Result type alias for ReportPilot operations.
pub type Result<T> = std::result::Result<T, ReportError>;
