//! Key-value store contract
//!
//! The loader needs three things from a store: open (implementation
//! specific), atomic batched writes, and a clean close. Keys overwrite on
//! repeat, so the last write of a key wins both within a batch and across
//! batches.

mod memory;
mod rocks;

pub use memory::{MemoryStore, MemoryStoreHandle};
pub use rocks::RocksStore;

use crate::NormalizedEntry;
use thiserror::Error;

/// Errors raised by a store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// RocksDB operation failed
    #[error("RocksDB error: {0}")]
    Rocks(#[from] rocksdb::Error),

    /// Any other backend failure
    #[error("{0}")]
    Backend(String),
}

/// Destination of committed batches
pub trait KvStore {
    /// Atomically write all entries, applied in order
    fn write_batch(&mut self, entries: &[NormalizedEntry]) -> Result<(), StoreError>;

    /// Flush and release the store. Called exactly once.
    fn close(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

/// Store configuration, tuned for large sequential bulk loads
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Create the store if it does not exist
    pub create_if_missing: bool,
    /// Memtable size in bytes before it is flushed to disk
    pub write_buffer_size: usize,
    /// Maximum number of table files held open
    pub max_open_files: i32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            write_buffer_size: crate::config::WRITE_BUFFER_SIZE,
            max_open_files: crate::config::MAX_OPEN_FILES,
        }
    }
}
