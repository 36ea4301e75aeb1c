#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// One immutable object holding one numbered chunk of a file's bytes.
///
/// Every adapter returns this neutral record directly, whatever its native
/// listing yields. Blobs of one file form a dense, zero-based, strictly
/// increasing `number` sequence; concatenating their contents in ascending
/// number order reconstructs the file's byte stream exactly. The connector
/// engine verifies density after every listing and reports a violation as a
/// consistency error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Container-relative object key (`<segments>.<number>`).
    pub key: String,
    /// Position of this blob in the file's sequence.
    pub number: u64,
    /// Object size in bytes.
    pub size: u64,
}

impl Blob {
    pub fn new(key: impl Into<String>, number: u64, size: u64) -> Self {
        Self {
            key: key.into(),
            number,
            size,
        }
    }
}
