//! Error handling for the Charrua CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Charrua(#[from] charrua_core::CharruaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State persistence error: {0}")]
    StatePersistence(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Booking could not continue; carries the message shown to the user
    #[error("{0}")]
    Booking(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<charrua_core::FormError> for CliError {
    fn from(err: charrua_core::FormError) -> Self {
        CliError::Charrua(err.into())
    }
}

impl From<charrua_core::DeepLinkError> for CliError {
    fn from(err: charrua_core::DeepLinkError) -> Self {
        CliError::Charrua(err.into())
    }
}

impl CliError {
    /// Whether the backend rejected the stored session
    pub fn is_session_expired(&self) -> bool {
        matches!(self, CliError::Charrua(err) if err.is_session_expired())
    }
}
