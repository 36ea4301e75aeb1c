#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used by backend adapters.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors surfaced by adapter calls.
///
/// Adapters wrap whatever their transport raises (network, auth,
/// throttling) into these variants; callers above the connector never see a
/// backend-native error type. The engine performs no retries on any of
/// them.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("i/o failure on {key:?}: {message}")]
    Io { key: String, message: String },

    #[error("object {key:?} not found")]
    NotFound { key: String },

    #[error("transport connect failed: {0}")]
    Connect(String),
}

impl BackendError {
    /// Convenience constructor for transport failures.
    pub fn io(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            key: key.into(),
            message: message.into(),
        }
    }
}
