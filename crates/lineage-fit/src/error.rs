use std::path::PathBuf;

use lineage_model::LineageError;

#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read CSV header of {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Lineage(#[from] LineageError),

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("invalid column pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("column {column} is not present in the table")]
    UnknownColumn { column: String },

    #[error("text column {column} has an empty vocabulary")]
    EmptyVocabulary { column: String },
}

impl FitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FitError>;
