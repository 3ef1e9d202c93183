//! Error types for the triplestore core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SPARQL parse error: {0}")]
    ParseError(String),

    #[error("triple pattern uses a variable predicate: {0:?}")]
    UnsupportedPattern(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("database '{0}' does not exist")]
    DatabaseMissing(String),
}

impl From<regex::Error> for StoreError {
    fn from(err: regex::Error) -> Self {
        StoreError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
