#![forbid(unsafe_code)]

//! `strata-path`
//!
//! Path model and key derivation for the strata abstract file system.
//!
//! A [`StorePath`] names a file or directory as a container (bucket, table,
//! cache name) plus an ordered list of segments. This crate derives the
//! string keys under which a file's numbered blobs live, and the match
//! patterns that separate one file's blobs from those of a file whose name
//! is a textual prefix of it.
//!
//! Everything here is pure; no I/O happens below this crate boundary.

mod error;
mod keys;
mod path;
mod validator;

pub use error::{PathError, PathResult};
pub use keys::{
    BLOB_SEPARATOR, SEPARATOR, blob_key, blob_key_prefix, blob_key_regex, blob_number_from_key,
    child_keys_prefix, child_keys_regex, container_key, directory_name_of_key, file_name_of_key,
    is_blob_key, is_directory_key,
};
pub use path::StorePath;
pub use validator::{NoOpValidator, PathValidator};
