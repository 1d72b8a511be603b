//! Error types for the core crate.

use thiserror::Error;

/// Infrastructure failures raised by storage and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A write was attempted through a read-only cache.
    #[error("cache is read-only")]
    ReadOnly,

    /// Committing tracked changes failed.
    #[error("unable to commit changes: {0}")]
    CommitFailed(String),

    /// A stored value could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Serialization of a stored value failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl CoreError {
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData(message.into())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
