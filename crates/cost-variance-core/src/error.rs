use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading the source tables. All of them are fatal:
/// a context is never built from a partially loaded dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing column in '{}': expected one of [{}]", .path.display(), .expected.join(", "))]
    MissingColumn { path: PathBuf, expected: Vec<String> },

    #[error("Invalid record in '{}' at line {line}: {reason}", .path.display())]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Duplicate {entity} '{key}' in '{}'", .path.display())]
    DuplicateKey {
        path: PathBuf,
        entity: String,
        key: String,
    },
}

#[derive(Debug, Error)]
pub enum CostVarianceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CostVarianceError {
    fn from(e: serde_json::Error) -> Self {
        CostVarianceError::SerializationError(e.to_string())
    }
}
