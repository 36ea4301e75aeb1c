#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used by `strata-path`.
pub type PathResult<T> = Result<T, PathError>;

/// Errors produced by path construction and validation.
///
/// All of these are raised before any key is derived and before any
/// backend call is made.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("container name must not be empty")]
    EmptyContainer,

    #[error("invalid container name {container:?}: {reason}")]
    InvalidContainer {
        container: String,
        reason: &'static str,
    },

    #[error("invalid path segment {segment:?}: {reason}")]
    InvalidSegment {
        segment: String,
        reason: &'static str,
    },
}
