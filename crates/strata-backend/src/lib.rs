#![forbid(unsafe_code)]

//! `strata-backend`
//!
//! The adapter contract of the strata abstract file system.
//!
//! A [`StoreBackend`] is the minimal set of operations a concrete blob
//! store integration must provide: enumerate a file's blobs, enumerate a
//! directory's child keys, read a byte range out of one blob, delete a set
//! of blobs, write buffers as one new immutable blob, and probe/create
//! directory markers. The connector engine composes these into file
//! semantics; adapters never see blob numbering decisions.
//!
//! Also provided here:
//! - [`ConnectOnce`], the init-once primitive for lazily opened transports,
//! - [`MemBackend`], an in-memory data-grid adapter used as the reference
//!   implementation and by the test suites of the higher crates.

mod backend;
mod blob;
mod connect;
mod error;
mod mem;

pub use backend::StoreBackend;
pub use blob::Blob;
pub use connect::ConnectOnce;
pub use error::{BackendError, BackendResult};
pub use mem::{MemBackend, MemBackendOptions};
