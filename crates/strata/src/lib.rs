#![forbid(unsafe_code)]

//! # strata
//!
//! Facade crate presenting heterogeneous blob stores — cloud object
//! stores, in-memory data grids, key-value caches — as one abstract file
//! system: named files in directories with random-offset reads,
//! append-style writes, move, copy and delete, emulated on top of whole,
//! immutable objects.
//!
//! ## Quick start
//!
//! ```
//! use bytes::Bytes;
//! use strata::prelude::*;
//!
//! # async fn demo() -> Result<(), strata::connector::ConnectorError> {
//! let connector = StoreConnector::caching(MemBackend::new());
//! let file = StorePath::new("grid", ["reports", "2026.bin"])?;
//!
//! connector.write(&file, &[Bytes::from_static(b"hello world")]).await?;
//! let tail = connector.read(&file, 6, 5).await?;
//! assert_eq!(&*tail, b"world");
//! # Ok(())
//! # }
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod path {
    pub use strata_path::*;
}

pub mod backend {
    pub use strata_backend::*;
}

pub mod connector {
    pub use strata_connector::*;
}

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use strata_backend::{Blob, MemBackend, StoreBackend};
    pub use strata_connector::{ConnectorOptions, DirEntry, StoreConnector};
    pub use strata_path::{PathValidator, StorePath};
}
