//! hgvsdb Core - Streaming HGVS to CA ID Loader
//!
//! Loads a gzip-compressed, newline-delimited JSON dump mapping HGVS
//! expressions to ClinGen canonical allele identifiers into a RocksDB
//! key-value store.
//!
//! # Architecture
//!
//! The loader is a single-threaded pipeline of three stages:
//!
//! - **Line Source**: lazy line iterator over the decompressed input
//! - **Normalizer**: classifies each line as an accepted entry or a skip
//! - **Batch Writer**: buffers entries and commits them in bounded batches
//!
//! The [`loader::Loader`] drives the stages and owns the store lifecycle.

pub mod loader;
pub mod normalize;
pub mod source;
pub mod store;
pub mod writer;

mod error;
mod types;

pub use error::{LoadError, Result, Stage};
pub use types::*;

/// hgvsdb version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    /// Entries accumulated before a batch is committed
    pub const DEFAULT_BATCH_SIZE: usize = 100_000;

    /// RocksDB write buffer size (128MB)
    pub const WRITE_BUFFER_SIZE: usize = 128 * 1024 * 1024;

    /// RocksDB cap on concurrently open table files
    pub const MAX_OPEN_FILES: i32 = 1000;

    /// Lines between progress markers
    pub const PROGRESS_INTERVAL: u64 = 100_000_000;

    /// Value stored when a record has no usable `ca_id`
    pub const NULL_CA_ID: &str = "NULL";
}
