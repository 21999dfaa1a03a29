//! Error types for message and translation loading

use thiserror::Error;

/// Errors that can occur while reading message or language files.
///
/// Lookups never return these; they log and fall back. Only the `try_*`
/// loaders surface them.
#[derive(Debug, Error)]
pub enum I18nError {
    /// File could not be read or parsed
    #[error("Failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: warden_config::ConfigError,
    },

    /// File parsed but is not a mapping
    #[error("Expected a mapping at the top of {0}")]
    NotAMapping(String),
}
