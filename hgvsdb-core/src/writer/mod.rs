//! Batched store writer
//!
//! Buffers normalized entries and commits them to the store in bounded
//! groups. The writer owns both the pending batch and the store handle.

use crate::store::{KvStore, RocksStore, StoreConfig};
use crate::{LoadError, NormalizedEntry, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Writer configuration
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Maximum entries per commit
    pub batch_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            batch_size: crate::config::DEFAULT_BATCH_SIZE,
        }
    }
}

impl WriterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LoadError::Config("batch size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Counters for committed data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriterStats {
    pub entries_written: u64,
    pub batches_committed: u64,
}

/// Accumulates entries and commits them in batches of at most
/// `batch_size`.
///
/// A full batch is committed when the next entry arrives, so input of
/// exactly `batch_size` entries produces a single commit from
/// [`BatchWriter::finish`].
pub struct BatchWriter<S: KvStore> {
    store: S,
    config: WriterConfig,
    batch: Vec<NormalizedEntry>,
    stats: WriterStats,
}

impl BatchWriter<RocksStore> {
    /// Open a RocksDB store at `path` and wrap it in a writer
    pub fn open(
        path: impl AsRef<Path>,
        store_config: &StoreConfig,
        config: WriterConfig,
    ) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let store = RocksStore::open(path, store_config).map_err(|source| LoadError::OpenStore {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(store, config)
    }
}

impl<S: KvStore> BatchWriter<S> {
    /// Create a writer over an already opened store
    pub fn new(store: S, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            batch: Vec::new(),
            stats: WriterStats::default(),
        })
    }

    /// Add an entry, committing the current batch first if it is full
    pub fn accept(&mut self, entry: NormalizedEntry) -> Result<()> {
        if self.batch.len() >= self.config.batch_size {
            self.commit()?;
        }
        self.batch.push(entry);
        Ok(())
    }

    /// Commit whatever is pending, regardless of size
    pub fn finish(&mut self) -> Result<()> {
        if !self.batch.is_empty() {
            self.commit()?;
        }
        Ok(())
    }

    /// Close the store and return the final counters
    pub fn close(self) -> Result<WriterStats> {
        let stats = self.stats;
        self.store
            .close()
            .map_err(|source| LoadError::CloseStore { source })?;
        Ok(stats)
    }

    /// Entries waiting for the next commit
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    fn commit(&mut self) -> Result<()> {
        // The batch is taken before writing; a failed batch is dropped.
        let batch = std::mem::take(&mut self.batch);
        let ordinal = self.stats.batches_committed + 1;
        let start = Instant::now();

        self.store
            .write_batch(&batch)
            .map_err(|source| LoadError::Commit {
                batch: ordinal,
                entries: batch.len(),
                source,
            })?;

        self.stats.batches_committed = ordinal;
        self.stats.entries_written += batch.len() as u64;
        debug!(
            "Committed batch {} ({} entries) in {:?}",
            ordinal,
            batch.len(),
            start.elapsed()
        );

        self.batch = Vec::with_capacity(batch.len());
        Ok(())
    }
}
