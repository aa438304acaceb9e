#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("master directory not found: {path}")]
    MissingMasterDir { path: PathBuf },

    #[error("missing master file: {path}")]
    MissingFile { path: PathBuf },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("missing required column `{column}` in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path} row {row}: column `{column}` is not a number: `{value}`")]
    InvalidNumber {
        path: PathBuf,
        row: u64,
        column: String,
        value: String,
    },

    #[error("missing setting `{key}` in {path}")]
    MissingSetting { path: PathBuf, key: String },

    #[error(transparent)]
    Model(#[from] ihc_model::ModelError),
}

impl IngestError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
