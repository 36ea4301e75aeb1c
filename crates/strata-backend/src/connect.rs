#![forbid(unsafe_code)]

use std::{fmt, future::Future};

use tokio::sync::OnceCell;

use crate::error::BackendResult;

/// Init-once holder for a lazily opened transport.
///
/// Blob store adapters typically open their connection (client, producer,
/// session) on first use rather than at construction. `ConnectOnce` gives
/// that pattern a single shape: concurrent first callers race into one
/// initialization, every other caller waits for its outcome, and a failed
/// initialization is returned to all waiters and retried on the next call
/// instead of poisoning the handle.
pub struct ConnectOnce<T> {
    cell: OnceCell<T>,
}

impl<T> ConnectOnce<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The connected transport, opening it through `connect` if this is the
    /// first use.
    pub async fn get_or_connect<F, Fut>(&self, connect: F) -> BackendResult<&T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        self.cell.get_or_try_init(connect).await
    }

    /// The transport, if already connected.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }
}

impl<T> Default for ConnectOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ConnectOnce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOnce")
            .field("connected", &self.cell.initialized())
            .finish()
    }
}
