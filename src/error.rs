use thiserror::Error;

use crate::model::TaskId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("malformed response from store: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Malformed data from the store is outside the normal failure modes of
    /// a request and is reported as an unexpected error.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, StoreError::Decode(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("{var} is not a valid URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },
}
