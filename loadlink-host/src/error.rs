//! Error types for the host logger

use loadlink_protocol::SessionError;

/// Result type alias
pub type Result<T> = std::result::Result<T, HostError>;

/// Host logger errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config values are inconsistent
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Host session could not be created
    #[error("Session error: {0:?}")]
    Session(SessionError),
}

impl From<SessionError> for HostError {
    fn from(err: SessionError) -> Self {
        HostError::Session(err)
    }
}
