use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Column '{column}' in {source_name}: {reason}")]
    SchemaMismatch {
        source_name: String,
        column: String,
        reason: String,
    },

    #[error("Key mismatch between '{measured}' and '{baseline}': {reason}")]
    KeyAlignment {
        measured: String,
        baseline: String,
        reason: String,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

impl AppError {
    pub fn schema(source_name: impl Into<String>, column: &str, reason: impl Into<String>) -> Self {
        AppError::SchemaMismatch {
            source_name: source_name.into(),
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
