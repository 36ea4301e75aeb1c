#![forbid(unsafe_code)]

use std::{num::NonZeroU64, ops::Range};

use async_trait::async_trait;
use bytes::Bytes;
use strata_path::StorePath;

use crate::{blob::Blob, error::BackendResult};

/// Minimal contract a concrete blob store integration must implement.
///
/// ## Contract (normative)
///
/// - All operations must be safe to call from concurrent tasks.
/// - Objects are immutable and whole: an adapter never overwrites or
///   appends to an existing object.
/// - Blob *numbering* belongs to the engine. [`write_blob`] receives the
///   target key fully formed; [`blobs_of`] merely reports what exists.
/// - Every failure must surface as a typed [`BackendError`]; the engine
///   performs no retries and no error translation beyond wrapping.
///
/// [`write_blob`]: StoreBackend::write_blob
/// [`blobs_of`]: StoreBackend::blobs_of
/// [`BackendError`]: crate::BackendError
#[async_trait]
pub trait StoreBackend: Send + Sync + 'static {
    /// All blobs of `file`, sorted by ascending number.
    ///
    /// Adapters may use native prefix listing filtered through
    /// [`blob_key_regex`](strata_path::blob_key_regex), or any native
    /// index.
    async fn blobs_of(&self, file: &StorePath) -> BackendResult<Vec<Blob>>;

    /// Container-relative keys of the immediate children of `directory`
    /// (blob keys and directory markers one level down).
    async fn child_keys_of(&self, directory: &StorePath) -> BackendResult<Vec<String>>;

    /// Read `range` out of one blob of `file`.
    ///
    /// Must return exactly `range.end - range.start` bytes or fail; a short
    /// transfer is an I/O error, never a truncated buffer.
    async fn read_blob_range(
        &self,
        file: &StorePath,
        blob: &Blob,
        range: Range<u64>,
    ) -> BackendResult<Bytes>;

    /// Delete the given blobs of `file`. Returns whether the full set was
    /// removed; partial removal is reported, not raised.
    async fn delete_blobs(&self, file: &StorePath, blobs: &[Blob]) -> BackendResult<bool>;

    /// Write the concatenation of `buffers` as exactly one new immutable
    /// object under the engine-supplied `key`. Returns the object's size.
    async fn write_blob(
        &self,
        file: &StorePath,
        key: &str,
        buffers: &[Bytes],
    ) -> BackendResult<u64>;

    /// Whether `directory` exists (marker object or any descendant key).
    async fn directory_exists(&self, directory: &StorePath) -> BackendResult<bool>;

    /// Create `directory`'s marker. Idempotent; creating an existing
    /// directory succeeds and leaves exactly one marker.
    async fn create_directory(&self, directory: &StorePath) -> BackendResult<bool>;

    /// Largest object this backend accepts in one write, if limited.
    ///
    /// The engine slices writes into blobs of at most this size. `None`
    /// means the whole write goes into a single blob.
    fn max_blob_size(&self) -> Option<NonZeroU64> {
        None
    }

    /// Native existence probe for `file`, when the backend has something
    /// cheaper than listing. `None` means "use the generic blob-list
    /// check".
    async fn file_exists_native(&self, _file: &StorePath) -> BackendResult<Option<bool>> {
        Ok(None)
    }

    /// Native server-side copy, when the backend offers one. Returns the
    /// copied size, or `None` to make the engine fall back to its generic
    /// blob-renumbering copy.
    async fn copy_file_native(
        &self,
        _source: &StorePath,
        _target: &StorePath,
    ) -> BackendResult<Option<u64>> {
        Ok(None)
    }

    /// Native server-side move. Returns `false` to make the engine fall
    /// back to copy-then-delete.
    async fn move_file_native(
        &self,
        _source: &StorePath,
        _target: &StorePath,
    ) -> BackendResult<bool> {
        Ok(false)
    }
}
