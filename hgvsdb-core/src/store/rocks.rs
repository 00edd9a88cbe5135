//! RocksDB-backed store

use super::{KvStore, StoreConfig, StoreError};
use crate::NormalizedEntry;
use rocksdb::{Options, WriteBatch, DB};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// RocksDB database opened for bulk loading.
///
/// The handle is released when the store is dropped, so early returns and
/// panics still close the database. [`KvStore::close`] additionally flushes
/// the memtable so the final state is on disk before the handle goes away.
pub struct RocksStore {
    db: DB,
    path: PathBuf,
}

impl RocksStore {
    /// Open (or create) a database at `path`
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_open_files(config.max_open_files);

        let db = DB::open(&opts, &path)?;
        info!(
            "Opened store at {:?} (write buffer {} bytes, max open files {})",
            path, config.write_buffer_size, config.max_open_files
        );

        Ok(Self { db, path })
    }
}

impl KvStore for RocksStore {
    fn write_batch(&mut self, entries: &[NormalizedEntry]) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();
        for entry in entries {
            batch.put(entry.key.as_bytes(), entry.value.as_bytes());
        }
        self.db.write(batch)?;
        Ok(())
    }

    fn close(self) -> Result<(), StoreError> {
        self.db.flush()?;
        debug!("Closed store at {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: &Path, key: &str) -> Option<String> {
        let db = DB::open_default(path).unwrap();
        db.get(key.as_bytes())
            .unwrap()
            .map(|v| String::from_utf8(v).unwrap())
    }

    #[test]
    fn test_write_and_close() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db");

        let mut store = RocksStore::open(&path, &StoreConfig::default()).unwrap();
        store
            .write_batch(&[
                NormalizedEntry::new("NM_000001.1:c.1A>T", "CA123"),
                NormalizedEntry::new("NM_000002.1:c.2G>C", "NULL"),
            ])
            .unwrap();
        store.close().unwrap();

        assert_eq!(read(&path, "NM_000001.1:c.1A>T").as_deref(), Some("CA123"));
        assert_eq!(read(&path, "NM_000002.1:c.2G>C").as_deref(), Some("NULL"));
        assert_eq!(read(&path, "missing"), None);
    }

    #[test]
    fn test_later_put_wins() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db");

        let mut store = RocksStore::open(&path, &StoreConfig::default()).unwrap();
        store
            .write_batch(&[NormalizedEntry::new("k", "first"), NormalizedEntry::new("k", "second")])
            .unwrap();
        store.write_batch(&[NormalizedEntry::new("j", "one")]).unwrap();
        store.write_batch(&[NormalizedEntry::new("j", "two")]).unwrap();
        store.close().unwrap();

        assert_eq!(read(&path, "k").as_deref(), Some("second"));
        assert_eq!(read(&path, "j").as_deref(), Some("two"));
    }

    #[test]
    fn test_reopen_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db");

        let mut store = RocksStore::open(&path, &StoreConfig::default()).unwrap();
        store.write_batch(&[NormalizedEntry::new("a", "CA1")]).unwrap();
        store.close().unwrap();

        let mut store = RocksStore::open(&path, &StoreConfig::default()).unwrap();
        store.write_batch(&[NormalizedEntry::new("b", "CA2")]).unwrap();
        store.close().unwrap();

        assert_eq!(read(&path, "a").as_deref(), Some("CA1"));
        assert_eq!(read(&path, "b").as_deref(), Some("CA2"));
    }

    #[test]
    fn test_open_without_create_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            create_if_missing: false,
            ..Default::default()
        };

        let result = RocksStore::open(temp_dir.path().join("absent"), &config);
        assert!(matches!(result, Err(StoreError::Rocks(_))));
    }

    #[test]
    fn test_second_open_is_locked() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db");

        let store = RocksStore::open(&path, &StoreConfig::default()).unwrap();
        assert!(RocksStore::open(&path, &StoreConfig::default()).is_err());

        store.close().unwrap();
        assert!(RocksStore::open(&path, &StoreConfig::default()).is_ok());
    }
}
