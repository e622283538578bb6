//! Error types for the risk-scoring pipeline.
//!
//! `RiskError` names every failure the pipeline distinguishes. Two variants are
//! recoverable inside the crate: `CorruptArtifact` (the store retrains) and
//! `SchemaMismatch` (the engine retrains once and retries). Everything else
//! propagates to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading data, training or scoring.
#[derive(Debug, Error)]
pub enum RiskError {
    /// No training data could be resolved for the configured source.
    #[error("Training data not found: {path} (sheet '{sheet}')")]
    DataSourceNotFound {
        /// Path that was looked up
        path: PathBuf,
        /// Sheet name used to resolve directory sources
        sheet: String,
    },

    /// The data file extension is not one the loader can read.
    #[error("Unsupported file format: '{extension}'. Supported formats: csv, parquet")]
    UnsupportedFormat { extension: String },

    /// A column required by a pipeline stage is absent.
    #[error("Required column '{0}' not found")]
    MissingColumn(String),

    /// The labeled table cannot support a stratified train/test split.
    #[error("Insufficient training data: {0}")]
    InsufficientTrainingData(String),

    /// The bundle's feature schema disagrees with the row the builder produces.
    #[error(
        "Feature schema mismatch: missing {missing:?}, unexpected {unexpected:?}, \
         conflicting {conflicting:?}"
    )]
    SchemaMismatch {
        /// Columns the row declares that the bundle was not trained on
        missing: Vec<String>,
        /// Columns the bundle expects that the row does not declare
        unexpected: Vec<String>,
        /// Columns present on both sides with a different kind or position
        conflicting: Vec<String>,
    },

    /// A categorical value was not seen at fit time and the encoder rejects unknowns.
    #[error("Unseen category '{value}' in column '{column}'")]
    UnseenCategory { column: String, value: String },

    /// The persisted artifact exists but cannot be read back.
    #[error("Corrupt model artifact {path}: {reason}")]
    CorruptArtifact { path: PathBuf, reason: String },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A payload field holds a value of the wrong shape.
    #[error("Invalid payload field '{field}': {value}")]
    InvalidPayload { field: String, value: String },

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RiskError {
    /// Whether this error signals feature drift between a bundle and the row builder.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, RiskError::SchemaMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_data_source_not_found_display() {
        let err = RiskError::DataSourceNotFound {
            path: PathBuf::from("data/loans"),
            sheet: "COLOCACIONES".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Training data not found: data/loans (sheet 'COLOCACIONES')"
        );
    }

    #[test]
    fn test_schema_mismatch_display_and_predicate() {
        let err = RiskError::SchemaMismatch {
            missing: vec!["TEA".to_string()],
            unexpected: vec![],
            conflicting: vec![],
        };
        assert!(err.is_schema_mismatch());
        assert!(err.to_string().contains("missing [\"TEA\"]"));
    }

    #[test]
    fn test_other_errors_are_not_schema_mismatch() {
        let err = RiskError::InsufficientTrainingData("empty table".to_string());
        assert!(!err.is_schema_mismatch());
        assert_eq!(err.to_string(), "Insufficient training data: empty table");
    }

    #[test]
    fn test_io_error_source() {
        let err: RiskError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, RiskError::Io(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("denied"));
    }
}
