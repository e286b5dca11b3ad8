//! Error types for cleanledger-client

use cleanledger_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid client configuration: {message}")]
    InvalidConfig { message: String },
}

impl ApiError {
    /// Map a failed call into the core error taxonomy
    pub fn into_core(self, operation: &str) -> CoreError {
        match self {
            ApiError::Unauthorized => CoreError::Unauthorized,
            ApiError::InvalidConfig { message } => CoreError::ConfigError { message },
            other => CoreError::persistence(operation, other.to_string()),
        }
    }
}
