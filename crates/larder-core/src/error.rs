//! Error types for Larder

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Too little data for a meaningful statistic. Callers show a
    /// "no data yet" state instead of failing.
    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    /// Only raised by strict-mode allocation
    #[error("Catalog is empty")]
    EmptyCatalog,

    #[error("Cannot mark {item} as {to}: already {from}")]
    InvalidTransition {
        item: String,
        from: String,
        to: String,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether the caller should degrade gracefully rather than report a failure
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InsufficientHistory(_) | Error::EmptyCatalog)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
