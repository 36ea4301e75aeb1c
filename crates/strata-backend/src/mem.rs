#![forbid(unsafe_code)]

//! In-memory data-grid backend.

use std::{num::NonZeroU64, ops::Range, sync::Arc};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use strata_path::{
    StorePath, blob_key_prefix, blob_key_regex, blob_number_from_key, child_keys_regex,
    container_key,
};

use crate::{
    backend::StoreBackend,
    blob::Blob,
    connect::ConnectOnce,
    error::{BackendError, BackendResult},
};

/// Configuration for [`MemBackend`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MemBackendOptions {
    /// Largest object accepted in one write. `None` = unlimited.
    pub max_blob_size: Option<NonZeroU64>,
}

/// Whole objects keyed by `(container, key)`.
#[derive(Debug, Default)]
struct Grid {
    objects: DashMap<(String, String), Bytes>,
}

/// In-memory [`StoreBackend`] modeled on a key-value data grid.
///
/// Objects live in a concurrent map of whole immutable values; listing is
/// prefix filtering through the derived key patterns, the way a grid
/// adapter filters its native index. The grid "connects" lazily on first
/// use through [`ConnectOnce`], mirroring transports that open on demand.
///
/// Serves as the reference implementation and as the backend for the
/// connector test suites.
#[derive(Clone, Debug)]
pub struct MemBackend {
    grid: Arc<ConnectOnce<Grid>>,
    options: MemBackendOptions,
}

impl MemBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(MemBackendOptions::default())
    }

    #[must_use]
    pub fn with_options(options: MemBackendOptions) -> Self {
        Self {
            grid: Arc::new(ConnectOnce::new()),
            options,
        }
    }

    /// Total number of stored objects (blobs and directory markers).
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.grid.get().map_or(0, |grid| grid.objects.len())
    }

    async fn grid(&self) -> BackendResult<&Grid> {
        self.grid.get_or_connect(|| async { Ok(Grid::default()) }).await
    }
}

impl Default for MemBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreBackend for MemBackend {
    async fn blobs_of(&self, file: &StorePath) -> BackendResult<Vec<Blob>> {
        let grid = self.grid().await?;
        let pattern = blob_key_regex(&blob_key_prefix(file));

        let mut blobs: Vec<Blob> = grid
            .objects
            .iter()
            .filter(|entry| entry.key().0 == file.container() && pattern.is_match(&entry.key().1))
            .filter_map(|entry| {
                let key = entry.key().1.clone();
                let number = blob_number_from_key(&key)?;
                Some(Blob::new(key, number, entry.value().len() as u64))
            })
            .collect();
        blobs.sort_by_key(|blob| blob.number);
        Ok(blobs)
    }

    async fn child_keys_of(&self, directory: &StorePath) -> BackendResult<Vec<String>> {
        let grid = self.grid().await?;
        let pattern = child_keys_regex(directory);

        let mut keys: Vec<String> = grid
            .objects
            .iter()
            .filter(|entry| {
                entry.key().0 == directory.container() && pattern.is_match(&entry.key().1)
            })
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn read_blob_range(
        &self,
        file: &StorePath,
        blob: &Blob,
        range: Range<u64>,
    ) -> BackendResult<Bytes> {
        let grid = self.grid().await?;
        let data = grid
            .objects
            .get(&(file.container().to_string(), blob.key.clone()))
            .ok_or_else(|| BackendError::NotFound {
                key: blob.key.clone(),
            })?;

        if range.start > range.end || range.end > data.len() as u64 {
            return Err(BackendError::io(
                &blob.key,
                format!(
                    "range {}..{} outside object of {} bytes",
                    range.start,
                    range.end,
                    data.len()
                ),
            ));
        }
        Ok(data.slice(range.start as usize..range.end as usize))
    }

    async fn delete_blobs(&self, file: &StorePath, blobs: &[Blob]) -> BackendResult<bool> {
        let grid = self.grid().await?;
        let mut removed = 0usize;
        for blob in blobs {
            if grid
                .objects
                .remove(&(file.container().to_string(), blob.key.clone()))
                .is_some()
            {
                removed += 1;
            }
        }
        Ok(removed == blobs.len())
    }

    async fn write_blob(
        &self,
        file: &StorePath,
        key: &str,
        buffers: &[Bytes],
    ) -> BackendResult<u64> {
        let total: u64 = buffers.iter().map(|buffer| buffer.len() as u64).sum();
        if let Some(max) = self.options.max_blob_size {
            if total > max.get() {
                return Err(BackendError::io(
                    key,
                    format!("object of {total} bytes exceeds backend limit of {max}"),
                ));
            }
        }

        let mut data = BytesMut::with_capacity(total as usize);
        for buffer in buffers {
            data.extend_from_slice(buffer);
        }

        let grid = self.grid().await?;
        grid.objects
            .insert((file.container().to_string(), key.to_string()), data.freeze());
        Ok(total)
    }

    async fn directory_exists(&self, directory: &StorePath) -> BackendResult<bool> {
        if directory.is_root() {
            return Ok(true);
        }
        let grid = self.grid().await?;
        let marker = container_key(directory);
        if grid
            .objects
            .contains_key(&(directory.container().to_string(), marker.clone()))
        {
            return Ok(true);
        }
        // No marker: the directory still exists if anything lives below it.
        Ok(grid.objects.iter().any(|entry| {
            entry.key().0 == directory.container() && entry.key().1.starts_with(&marker)
        }))
    }

    async fn create_directory(&self, directory: &StorePath) -> BackendResult<bool> {
        if directory.is_root() {
            return Ok(true);
        }
        let grid = self.grid().await?;
        grid.objects
            .entry((directory.container().to_string(), container_key(directory)))
            .or_insert_with(Bytes::new);
        Ok(true)
    }

    fn max_blob_size(&self) -> Option<NonZeroU64> {
        self.options.max_blob_size
    }
}
