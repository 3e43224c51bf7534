//! Error types for Nudge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// Rejected before any store access (bad user id, malformed date, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A collaborator (aggregation query or store) failed mid-evaluation.
    /// Nothing from the evaluation was persisted.
    #[error("Evaluation failed: {0}")]
    Evaluation(#[source] Box<Error>),
}

impl Error {
    /// Wrap a collaborator failure as a single evaluation error.
    ///
    /// Input errors pass through untouched so callers can still tell them apart.
    pub fn evaluation(err: Error) -> Self {
        match err {
            Error::InvalidInput(_) | Error::Evaluation(_) => err,
            other => Error::Evaluation(Box::new(other)),
        }
    }

    /// True for errors caused by the caller's input rather than the system
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
