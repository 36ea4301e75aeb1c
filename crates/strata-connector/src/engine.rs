#![forbid(unsafe_code)]

use std::{
    collections::HashSet,
    fmt,
    num::NonZeroU64,
    ops::Range,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bytes::{Bytes, BytesMut};
use strata_backend::{Blob, StoreBackend};
use strata_path::{
    StorePath, blob_key, directory_name_of_key, file_name_of_key, is_directory_key,
};
use tracing::{debug, warn};

use crate::{
    cache::ListingCache,
    error::{ConnectorError, ConnectorResult, MovePhase},
    options::ConnectorOptions,
};

/// One entry of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DirEntry {
    Directory(String),
    File(String),
}

impl DirEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Directory(name) | Self::File(name) => name,
        }
    }
}

struct Inner<B> {
    backend: B,
    cache: ListingCache,
    options: ConnectorOptions,
    open: AtomicBool,
}

/// The backend-agnostic connector engine.
///
/// Composes a [`StoreBackend`] into file semantics: size, random-offset
/// reads, append-style writes, existence checks, move, copy, truncate and
/// directory listing, all expressed through the numbered-blob protocol.
/// Cheap to clone; clones share the backend, the listing cache and the
/// open flag.
///
/// Every operation validates its paths first, and every mutation drops the
/// cache entries of the paths it touched before returning — also on
/// failure — so a follow-up read from this connector instance never
/// observes stale success state. Nothing is guaranteed across separate
/// connector instances talking to the same backend.
#[derive(Clone)]
pub struct StoreConnector<B: StoreBackend> {
    inner: Arc<Inner<B>>,
}

impl<B: StoreBackend> StoreConnector<B> {
    /// Connector without a listing cache: every read consults the backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, ConnectorOptions::new())
    }

    /// Connector with the per-path listing cache enabled.
    #[must_use]
    pub fn caching(backend: B) -> Self {
        Self::with_options(backend, ConnectorOptions::new().with_cache(true))
    }

    #[must_use]
    pub fn with_options(backend: B, options: ConnectorOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                cache: ListingCache::new(options.use_cache),
                options,
                open: AtomicBool::new(true),
            }),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Close the connector. Terminal: every subsequent operation fails
    /// with [`ConnectorError::Closed`]. Transport teardown belongs to the
    /// backend adapter.
    pub fn close(&self) {
        self.inner.open.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::SeqCst)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Total size of `file`: the sum of its blob sizes. An absent file has
    /// size 0; use [`file_exists`](Self::file_exists) to tell the two
    /// apart.
    pub async fn file_size(&self, file: &StorePath) -> ConnectorResult<u64> {
        self.check(file)?;
        let blobs = self.blobs_cached(file).await?;
        Ok(total_size(&blobs))
    }

    /// Whether `file` exists: at least one blob matches its key pattern,
    /// or the backend's native probe says so.
    pub async fn file_exists(&self, file: &StorePath) -> ConnectorResult<bool> {
        self.check(file)?;
        if let Some(answer) = self.inner.backend.file_exists_native(file).await? {
            return Ok(answer);
        }
        let blobs = self.blobs_cached(file).await?;
        Ok(!blobs.is_empty())
    }

    pub async fn directory_exists(&self, directory: &StorePath) -> ConnectorResult<bool> {
        self.check(directory)?;
        Ok(self.inner.backend.directory_exists(directory).await?)
    }

    /// Whether `directory` has no immediate children.
    pub async fn is_empty(&self, directory: &StorePath) -> ConnectorResult<bool> {
        self.check(directory)?;
        let children = self.children_cached(directory).await?;
        Ok(children.is_empty())
    }

    /// Immediate children of `directory`, as directory and file names.
    ///
    /// Blob keys collapse into one file entry per file name; keys outside
    /// the connector's naming scheme are skipped.
    pub async fn list_children(&self, directory: &StorePath) -> ConnectorResult<Vec<DirEntry>> {
        self.check(directory)?;
        let keys = self.children_cached(directory).await?;

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for key in keys.iter() {
            let entry = if is_directory_key(key) {
                directory_name_of_key(key).map(|name| DirEntry::Directory(name.to_string()))
            } else {
                file_name_of_key(key).map(|name| DirEntry::File(name.to_string()))
            };
            if let Some(entry) = entry {
                if seen.insert(entry.clone()) {
                    entries.push(entry);
                }
            }
        }
        Ok(entries)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// Read exactly `length` bytes of `file` starting at `offset`.
    ///
    /// Fails with a range error when `offset + length` exceeds the file's
    /// reconstructed size. The read may fan out into several blob reads; a
    /// failing or short blob read aborts the whole operation — a caller
    /// never receives a silently truncated buffer.
    pub async fn read(&self, file: &StorePath, offset: u64, length: u64) -> ConnectorResult<Bytes> {
        self.check(file)?;
        self.read_internal(file, offset, Some(length)).await
    }

    /// Read from `offset` to the end of `file`.
    pub async fn read_to_end(&self, file: &StorePath, offset: u64) -> ConnectorResult<Bytes> {
        self.check(file)?;
        self.read_internal(file, offset, None).await
    }

    /// Fill `target` with `target.len()` bytes of `file` starting at
    /// `offset`. Returns the number of bytes read (always the full buffer,
    /// or the call fails).
    pub async fn read_into(
        &self,
        file: &StorePath,
        target: &mut [u8],
        offset: u64,
    ) -> ConnectorResult<u64> {
        self.check(file)?;
        let data = self
            .read_internal(file, offset, Some(target.len() as u64))
            .await?;
        target.copy_from_slice(&data);
        Ok(data.len() as u64)
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Append the concatenation of `buffers` to `file` as new blobs.
    ///
    /// The input is sliced into blobs of at most the backend's
    /// `max_blob_size`, numbered sequentially after the file's current
    /// last blob. Each blob write is durable once the adapter returns: a
    /// mid-sequence failure means "appended some whole number of blobs,
    /// then failed", never a corrupted existing blob. Returns the total
    /// input size; zero-byte input writes no blob.
    pub async fn write(&self, file: &StorePath, buffers: &[Bytes]) -> ConnectorResult<u64> {
        self.check(file)?;
        let result = self.write_inner(file, buffers).await;
        self.invalidate_with_parent(file);
        result
    }

    /// Delete every blob of `file`. Returns the adapter's flag for whether
    /// the full set was removed; `false` for an absent file.
    pub async fn delete_file(&self, file: &StorePath) -> ConnectorResult<bool> {
        self.check(file)?;
        let result = self.delete_inner(file).await;
        self.invalidate_with_parent(file);
        result
    }

    /// Cut `file` down to `new_length` bytes.
    ///
    /// Length 0 deletes the file; a length beyond the current size is a
    /// range error; the current size is a no-op. A cut inside a blob
    /// rewrites that blob's kept prefix under the same number.
    pub async fn truncate_file(&self, file: &StorePath, new_length: u64) -> ConnectorResult<()> {
        self.check(file)?;
        let result = if new_length == 0 {
            self.delete_inner(file).await.map(|_| ())
        } else {
            self.truncate_inner(file, new_length).await
        };
        self.invalidate_with_parent(file);
        result
    }

    /// Create `directory`'s marker. Idempotent.
    pub async fn create_directory(&self, directory: &StorePath) -> ConnectorResult<bool> {
        self.check(directory)?;
        let result = self.inner.backend.create_directory(directory).await;
        self.invalidate_with_parent(directory);
        Ok(result?)
    }

    /// Files come into being with their first write; this only validates
    /// and reports success, matching stores without a create primitive.
    pub async fn create_file(&self, file: &StorePath) -> ConnectorResult<bool> {
        self.check(file)?;
        Ok(true)
    }

    /// Copy `source` onto `target`, replacing any existing target content.
    ///
    /// Uses the backend's native copy when offered; the generic fallback
    /// deletes the target's blobs, then rewrites the source's blobs under
    /// the target numbered from 0. Returns the copied size.
    pub async fn copy_file(&self, source: &StorePath, target: &StorePath) -> ConnectorResult<u64> {
        self.check(source)?;
        self.validate(target)?;
        let result = self.copy_inner(source, target).await;
        self.invalidate_with_parent(target);
        result
    }

    /// Move `source` onto `target`, replacing any existing target content.
    ///
    /// Uses the backend's native move when offered. The generic fallback
    /// interleaves copy and delete per blob — each source blob is deleted
    /// as soon as its copy is durable — so a mid-operation failure leaves a
    /// recoverable, inspectable state instead of silently losing data. The
    /// error then reports the frozen phase and blob index.
    pub async fn move_file(&self, source: &StorePath, target: &StorePath) -> ConnectorResult<()> {
        self.check(source)?;
        self.validate(target)?;
        let result = self.move_inner(source, target).await;
        self.invalidate_with_parent(source);
        self.invalidate_with_parent(target);
        result
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn ensure_open(&self) -> ConnectorResult<()> {
        if !self.is_open() {
            return Err(ConnectorError::Closed);
        }
        Ok(())
    }

    fn validate(&self, path: &StorePath) -> ConnectorResult<()> {
        self.inner.options.validator.validate(path)?;
        Ok(())
    }

    fn check(&self, path: &StorePath) -> ConnectorResult<()> {
        self.ensure_open()?;
        self.validate(path)
    }

    fn invalidate_with_parent(&self, path: &StorePath) {
        self.inner.cache.invalidate(path);
        if let Some(parent) = path.parent() {
            self.inner.cache.invalidate(&parent);
        }
    }

    async fn blobs_cached(&self, file: &StorePath) -> ConnectorResult<Arc<Vec<Blob>>> {
        if let Some(hit) = self.inner.cache.blobs(file) {
            return Ok(hit);
        }
        let blobs = self.inner.backend.blobs_of(file).await?;
        ensure_dense(file, &blobs)?;
        let blobs = Arc::new(blobs);
        self.inner.cache.put_blobs(file, blobs.clone());
        Ok(blobs)
    }

    async fn children_cached(&self, directory: &StorePath) -> ConnectorResult<Arc<Vec<String>>> {
        if let Some(hit) = self.inner.cache.children(directory) {
            return Ok(hit);
        }
        let children = Arc::new(self.inner.backend.child_keys_of(directory).await?);
        self.inner.cache.put_children(directory, children.clone());
        Ok(children)
    }

    /// Read one blob range and insist on a full transfer.
    async fn read_blob(
        &self,
        file: &StorePath,
        blob: &Blob,
        range: Range<u64>,
    ) -> ConnectorResult<Bytes> {
        let expected = range.end - range.start;
        let chunk = self.inner.backend.read_blob_range(file, blob, range).await?;
        if chunk.len() as u64 != expected {
            return Err(ConnectorError::ShortRead {
                key: blob.key.clone(),
                expected,
                actual: chunk.len() as u64,
            });
        }
        Ok(chunk)
    }

    async fn read_internal(
        &self,
        file: &StorePath,
        offset: u64,
        requested: Option<u64>,
    ) -> ConnectorResult<Bytes> {
        let blobs = self.blobs_cached(file).await?;
        let total = total_size(&blobs);

        let length = match requested {
            Some(length) => {
                let end = offset.checked_add(length).filter(|end| *end <= total);
                if end.is_none() {
                    return Err(ConnectorError::Range {
                        path: file.full_qualified_name(),
                        offset,
                        length,
                        size: total,
                    });
                }
                length
            }
            None => {
                if offset > total {
                    return Err(ConnectorError::Range {
                        path: file.full_qualified_name(),
                        offset,
                        length: 0,
                        size: total,
                    });
                }
                total - offset
            }
        };
        if length == 0 {
            return Ok(Bytes::new());
        }

        let mut assembled = BytesMut::with_capacity(length as usize);
        let mut remaining = length;
        let mut blob_start = 0u64;
        for blob in blobs.iter() {
            let blob_end = blob_start + blob.size;
            if blob_end <= offset {
                blob_start = blob_end;
                continue;
            }
            if remaining == 0 {
                break;
            }

            let local_offset = offset.saturating_sub(blob_start);
            let amount = (blob.size - local_offset).min(remaining);
            let chunk = self
                .read_blob(file, blob, local_offset..local_offset + amount)
                .await?;
            assembled.extend_from_slice(&chunk);
            remaining -= amount;
            blob_start = blob_end;
        }
        Ok(assembled.freeze())
    }

    async fn write_inner(&self, file: &StorePath, buffers: &[Bytes]) -> ConnectorResult<u64> {
        let blobs = self.blobs_cached(file).await?;
        let mut next = blobs.last().map_or(0, |blob| blob.number + 1);

        let total: u64 = buffers.iter().map(|buffer| buffer.len() as u64).sum();
        if total == 0 {
            return Ok(0);
        }

        let chunks = chunk_buffers(buffers, self.inner.backend.max_blob_size());
        let count = chunks.len();
        for chunk in chunks {
            let key = blob_key(file, next);
            self.inner.backend.write_blob(file, &key, &chunk).await?;
            next += 1;
        }
        debug!(
            path = %file,
            bytes = total,
            blobs = count,
            "appended blobs"
        );
        Ok(total)
    }

    async fn delete_inner(&self, file: &StorePath) -> ConnectorResult<bool> {
        let blobs = self.blobs_cached(file).await?;
        if blobs.is_empty() {
            return Ok(false);
        }
        let complete = self.inner.backend.delete_blobs(file, &blobs).await?;
        if complete {
            debug!(path = %file, blobs = blobs.len(), "deleted file");
        } else {
            warn!(path = %file, "backend removed only part of the blob set");
        }
        Ok(complete)
    }

    /// Delete `blobs` and require the full set to go.
    async fn delete_exact(&self, file: &StorePath, blobs: &[Blob]) -> ConnectorResult<()> {
        let complete = self.inner.backend.delete_blobs(file, blobs).await?;
        if !complete {
            return Err(ConnectorError::consistency(
                file.full_qualified_name(),
                "backend removed only part of the blob set",
            ));
        }
        Ok(())
    }

    async fn truncate_inner(&self, file: &StorePath, new_length: u64) -> ConnectorResult<()> {
        let blobs = self.blobs_cached(file).await?;
        let total = total_size(&blobs);
        if new_length > total {
            return Err(ConnectorError::Range {
                path: file.full_qualified_name(),
                offset: new_length,
                length: 0,
                size: total,
            });
        }
        if new_length == total {
            return Ok(());
        }

        let mut blob_start = 0u64;
        for (index, blob) in blobs.iter().enumerate() {
            let blob_end = blob_start + blob.size;
            if blob_start == new_length {
                // Cut on a blob boundary: this blob and its successors go.
                self.delete_exact(file, &blobs[index..]).await?;
                debug!(path = %file, new_length, "truncated on blob boundary");
                return Ok(());
            }
            if blob_end > new_length {
                // Cut inside this blob: rewrite its kept prefix under the
                // same number, then drop it and its successors.
                let keep = new_length - blob_start;
                let prefix = self.read_blob(file, blob, 0..keep).await?;
                self.delete_exact(file, &blobs[index..]).await?;
                self.inner
                    .backend
                    .write_blob(file, &blob_key(file, blob.number), &[prefix])
                    .await?;
                debug!(path = %file, new_length, "truncated inside blob");
                return Ok(());
            }
            blob_start = blob_end;
        }
        Ok(())
    }

    async fn copy_inner(&self, source: &StorePath, target: &StorePath) -> ConnectorResult<u64> {
        if let Some(copied) = self.inner.backend.copy_file_native(source, target).await? {
            debug!(source = %source, target = %target, bytes = copied, "native copy");
            return Ok(copied);
        }

        let source_blobs = self.blobs_cached(source).await?;
        if source_blobs.is_empty() {
            return Err(ConnectorError::NotFound {
                path: source.full_qualified_name(),
            });
        }

        let existing = self.blobs_cached(target).await?;
        if !existing.is_empty() {
            self.delete_exact(target, &existing).await?;
        }

        let mut copied = 0u64;
        for (index, blob) in source_blobs.iter().enumerate() {
            let data = self.read_blob(source, blob, 0..blob.size).await?;
            let key = blob_key(target, index as u64);
            copied += self.inner.backend.write_blob(target, &key, &[data]).await?;
        }
        debug!(source = %source, target = %target, bytes = copied, "copied file");
        Ok(copied)
    }

    async fn move_inner(&self, source: &StorePath, target: &StorePath) -> ConnectorResult<()> {
        if self.inner.backend.move_file_native(source, target).await? {
            debug!(source = %source, target = %target, "native move");
            return Ok(());
        }

        let source_blobs = self.blobs_cached(source).await?;
        if source_blobs.is_empty() {
            return Err(ConnectorError::NotFound {
                path: source.full_qualified_name(),
            });
        }

        let existing = self.blobs_cached(target).await?;
        if !existing.is_empty() {
            self.delete_exact(target, &existing).await?;
        }

        for (index, blob) in source_blobs.iter().enumerate() {
            let index = index as u64;

            let data = self
                .read_blob(source, blob, 0..blob.size)
                .await
                .map_err(|cause| frozen(source, MovePhase::Copying, index, cause))?;
            self.inner
                .backend
                .write_blob(target, &blob_key(target, index), &[data])
                .await
                .map_err(|cause| frozen(source, MovePhase::Copying, index, cause.into()))?;

            let complete = self
                .inner
                .backend
                .delete_blobs(source, std::slice::from_ref(blob))
                .await
                .map_err(|cause| frozen(source, MovePhase::DeletingSource, index, cause.into()))?;
            if !complete {
                let cause = ConnectorError::consistency(
                    source.full_qualified_name(),
                    "source blob vanished before deletion",
                );
                return Err(frozen(source, MovePhase::DeletingSource, index, cause));
            }
        }
        debug!(source = %source, target = %target, "moved file");
        Ok(())
    }
}

impl<B: StoreBackend> fmt::Debug for StoreConnector<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConnector")
            .field("open", &self.is_open())
            .field("use_cache", &self.inner.options.use_cache)
            .finish_non_exhaustive()
    }
}

fn total_size(blobs: &[Blob]) -> u64 {
    blobs.iter().map(|blob| blob.size).sum()
}

fn ensure_dense(file: &StorePath, blobs: &[Blob]) -> ConnectorResult<()> {
    for (index, blob) in blobs.iter().enumerate() {
        let expected = index as u64;
        if blob.number != expected {
            warn!(path = %file, expected, found = blob.number, "blob numbering gap");
            return Err(ConnectorError::consistency(
                file.full_qualified_name(),
                format!("blob number {} where {expected} was expected", blob.number),
            ));
        }
    }
    Ok(())
}

fn frozen(source: &StorePath, phase: MovePhase, index: u64, cause: ConnectorError) -> ConnectorError {
    ConnectorError::MoveInterrupted {
        path: source.full_qualified_name(),
        phase,
        index,
        cause: Box::new(cause),
    }
}

/// Slice the logical concatenation of `buffers` into per-blob buffer
/// groups of at most `max_blob_size` bytes. `Bytes` slicing is cheap, so
/// no payload is copied here.
fn chunk_buffers(buffers: &[Bytes], max_blob_size: Option<NonZeroU64>) -> Vec<Vec<Bytes>> {
    let Some(max) = max_blob_size else {
        return vec![
            buffers
                .iter()
                .filter(|buffer| !buffer.is_empty())
                .cloned()
                .collect(),
        ];
    };
    let max = usize::try_from(max.get()).unwrap_or(usize::MAX);

    let mut chunks = Vec::new();
    let mut current: Vec<Bytes> = Vec::new();
    let mut current_len = 0usize;
    for buffer in buffers {
        let mut rest = buffer.clone();
        while !rest.is_empty() {
            if current_len == max {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let take = rest.len().min(max - current_len);
            current.push(rest.split_to(take));
            current_len += take;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
