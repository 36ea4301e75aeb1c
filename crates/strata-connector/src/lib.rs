#![forbid(unsafe_code)]

//! `strata-connector`
//!
//! The backend-agnostic connector engine of the strata abstract file
//! system.
//!
//! A [`StoreConnector`] turns any [`StoreBackend`](strata_backend::StoreBackend)
//! — a store of whole, immutable objects with prefix listing — into files
//! that support random-offset reads, append-style writes, size queries,
//! existence checks, move, copy, truncate and delete. A file's bytes are
//! split across a dense, zero-based sequence of numbered blobs; the engine
//! reconstructs ranges from that sequence and appends to it without ever
//! rewriting an existing object.
//!
//! The engine keeps an optional per-path cache of blob listings and child
//! keys (never of file content). Within one connector instance, a
//! mutation's cache invalidation happens before the call returns, so a
//! follow-up read observes it; across instances, the backing store's own
//! consistency model applies.

mod cache;
mod engine;
mod error;
mod options;

pub use engine::{DirEntry, StoreConnector};
pub use error::{ConnectorError, ConnectorResult, MovePhase};
pub use options::ConnectorOptions;
