//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, metadata, RSR-table, and band-selection errors, and
//! provides semantic variants for configuration validation and toolkit failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata error: {0}")]
    Metadata(#[from] crate::io::MetadataError),

    #[error("RSR table error: {0}")]
    Rsr(#[from] crate::core::rsr::RsrError),

    #[error("band selection error: {0}")]
    Band(#[from] crate::core::bands::BandError),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Configuration file path is invalid: {0}")]
    InvalidConfigPath(std::path::PathBuf),

    #[error("Missing parameter for model generation: {name}")]
    MissingParameter { name: &'static str },

    #[error("Input file is invalid: {0}")]
    InvalidInputPath(std::path::PathBuf),

    #[error("toolkit application `{application}` failed: {reason}")]
    Toolkit { application: String, reason: String },

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }
}
