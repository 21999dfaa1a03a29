// Errors raised while reading settings, message and language files

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// File or `.env` source missing, or no usable format for it
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// File exists but could not be read
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Parsed document does not fit the settings layout
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
