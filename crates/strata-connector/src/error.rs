#![forbid(unsafe_code)]

use strata_backend::BackendError;
use strata_path::PathError;
use thiserror::Error;

/// Result type used by the connector engine.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Phase the generic move state machine was in when it froze.
///
/// A move processes one blob index at a time: `Copying(i)` reads the source
/// blob and writes it under the target, `DeletingSource(i)` removes the
/// source blob once its copy is durable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovePhase {
    Copying,
    DeletingSource,
}

/// Errors produced by connector operations.
///
/// The engine propagates the first failing adapter call after performing
/// the cache invalidation owed by the operation; it never retries.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("validation error: {0}")]
    Validation(#[from] PathError),

    #[error("{path} not found")]
    NotFound { path: String },

    #[error("range {offset}+{length} exceeds size {size} of {path}")]
    Range {
        path: String,
        offset: u64,
        length: u64,
        size: u64,
    },

    #[error("consistency violation on {path}: {detail}")]
    Consistency { path: String, detail: String },

    #[error("short read from blob {key:?}: expected {expected} bytes, got {actual}")]
    ShortRead {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("backend error: {0}")]
    Io(#[from] BackendError),

    #[error("connector is closed")]
    Closed,

    #[error("move of {path} interrupted while {phase:?} blob {index}: {cause}")]
    MoveInterrupted {
        path: String,
        phase: MovePhase,
        index: u64,
        #[source]
        cause: Box<ConnectorError>,
    },
}

impl ConnectorError {
    pub(crate) fn consistency(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Consistency {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
