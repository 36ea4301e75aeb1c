#![allow(dead_code)]

use std::{
    num::NonZeroU64,
    ops::Range,
    sync::atomic::{AtomicIsize, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use strata_backend::{BackendError, BackendResult, Blob, MemBackend, StoreBackend};
use strata_path::StorePath;

/// Backend wrapper that injects failures after a configured number of
/// write or delete calls, for exercising partial-failure paths.
pub struct FaultBackend {
    inner: MemBackend,
    write_budget: AtomicIsize,
    delete_budget: AtomicIsize,
}

impl FaultBackend {
    pub fn new(inner: MemBackend) -> Self {
        Self {
            inner,
            write_budget: AtomicIsize::new(isize::MAX),
            delete_budget: AtomicIsize::new(isize::MAX),
        }
    }

    /// Let `n` further `write_blob` calls succeed, then fail every one.
    pub fn fail_writes_after(&self, n: usize) {
        self.write_budget.store(n as isize, Ordering::SeqCst);
    }

    /// Let `n` further `delete_blobs` calls succeed, then fail every one.
    pub fn fail_deletes_after(&self, n: usize) {
        self.delete_budget.store(n as isize, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemBackend {
        &self.inner
    }

    fn spend(budget: &AtomicIsize, what: &str) -> BackendResult<()> {
        if budget.fetch_sub(1, Ordering::SeqCst) <= 0 {
            return Err(BackendError::io("<injected>", format!("injected {what} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for FaultBackend {
    async fn blobs_of(&self, file: &StorePath) -> BackendResult<Vec<Blob>> {
        self.inner.blobs_of(file).await
    }

    async fn child_keys_of(&self, directory: &StorePath) -> BackendResult<Vec<String>> {
        self.inner.child_keys_of(directory).await
    }

    async fn read_blob_range(
        &self,
        file: &StorePath,
        blob: &Blob,
        range: Range<u64>,
    ) -> BackendResult<Bytes> {
        self.inner.read_blob_range(file, blob, range).await
    }

    async fn delete_blobs(&self, file: &StorePath, blobs: &[Blob]) -> BackendResult<bool> {
        Self::spend(&self.delete_budget, "delete")?;
        self.inner.delete_blobs(file, blobs).await
    }

    async fn write_blob(
        &self,
        file: &StorePath,
        key: &str,
        buffers: &[Bytes],
    ) -> BackendResult<u64> {
        Self::spend(&self.write_budget, "write")?;
        self.inner.write_blob(file, key, buffers).await
    }

    async fn directory_exists(&self, directory: &StorePath) -> BackendResult<bool> {
        self.inner.directory_exists(directory).await
    }

    async fn create_directory(&self, directory: &StorePath) -> BackendResult<bool> {
        self.inner.create_directory(directory).await
    }

    fn max_blob_size(&self) -> Option<NonZeroU64> {
        self.inner.max_blob_size()
    }
}

/// Backend wrapper that counts listing calls, for asserting cache hits.
pub struct CountingBackend {
    inner: MemBackend,
    listings: AtomicUsize,
}

impl CountingBackend {
    pub fn new(inner: MemBackend) -> Self {
        Self {
            inner,
            listings: AtomicUsize::new(0),
        }
    }

    pub fn listing_calls(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreBackend for CountingBackend {
    async fn blobs_of(&self, file: &StorePath) -> BackendResult<Vec<Blob>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.inner.blobs_of(file).await
    }

    async fn child_keys_of(&self, directory: &StorePath) -> BackendResult<Vec<String>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.inner.child_keys_of(directory).await
    }

    async fn read_blob_range(
        &self,
        file: &StorePath,
        blob: &Blob,
        range: Range<u64>,
    ) -> BackendResult<Bytes> {
        self.inner.read_blob_range(file, blob, range).await
    }

    async fn delete_blobs(&self, file: &StorePath, blobs: &[Blob]) -> BackendResult<bool> {
        self.inner.delete_blobs(file, blobs).await
    }

    async fn write_blob(
        &self,
        file: &StorePath,
        key: &str,
        buffers: &[Bytes],
    ) -> BackendResult<u64> {
        self.inner.write_blob(file, key, buffers).await
    }

    async fn directory_exists(&self, directory: &StorePath) -> BackendResult<bool> {
        self.inner.directory_exists(directory).await
    }

    async fn create_directory(&self, directory: &StorePath) -> BackendResult<bool> {
        self.inner.create_directory(directory).await
    }

    fn max_blob_size(&self) -> Option<NonZeroU64> {
        self.inner.max_blob_size()
    }
}
