//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] snack_storage::StorageError),

    #[error("Tab error: {0}")]
    Tab(#[from] snack_tabs::TabError),

    #[error("Session error: {0}")]
    Session(#[from] snack_session::SessionError),

    #[error("Rendering host error: {0}")]
    Host(#[from] HostError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure reported by a rendering host implementation
#[derive(Error, Debug)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}
