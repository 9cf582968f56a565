//! Error types shared across the crate.

use thiserror::Error;

use crate::store::StoreError;

/// Result alias used by fallible library operations.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Field path in the configuration (e.g. `"reducedCapacityLineups.A01"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    /// Creates an error for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Top-level error for configuration loading, storage, and export.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The configuration could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configuration parsed but failed validation.
    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ConfigError>),
    /// The configuration store rejected the request.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialisation failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV export failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_names_field() {
        let err = ConfigError::new("powerFactor", "must be in (0, 1]");
        assert_eq!(err.to_string(), "config error: powerFactor: must be in (0, 1]");
    }

    #[test]
    fn invalid_lists_every_problem() {
        let err = PlanError::Invalid(vec![
            ConfigError::new("lineupMaxKW", "must be >= 0"),
            ConfigError::new("subfeedsPerPDU", "must be > 0"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid configuration: lineupMaxKW: must be >= 0; subfeedsPerPDU: must be > 0"
        );
    }
}
