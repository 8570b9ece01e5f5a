//! Error types for Pennywise

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Model not trained")]
    NotTrained,

    #[error("Training error: {0}")]
    Training(String),

    #[error("Model error: {0}")]
    Model(String),
}

impl From<smartcore::error::Failed> for Error {
    fn from(err: smartcore::error::Failed) -> Self {
        Error::Model(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
