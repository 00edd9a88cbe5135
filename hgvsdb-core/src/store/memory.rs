//! In-memory store, used to exercise the writer and loader in tests

use super::{KvStore, StoreError};
use crate::NormalizedEntry;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct MemoryState {
    data: BTreeMap<String, String>,
    commits: Vec<usize>,
    closes: usize,
    fail_on_commit: Option<usize>,
}

/// Store that keeps everything in a sorted map.
///
/// Every commit size is recorded, and a commit can be made to fail so error
/// paths can be exercised. A [`MemoryStoreHandle`] observes the same state
/// after the store itself has been handed off and closed.
#[derive(Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

/// Read-only view of a [`MemoryStore`]
#[derive(Clone)]
pub struct MemoryStoreHandle {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`-th commit (1-based) fail
    pub fn fail_on_commit(self, n: usize) -> Self {
        self.state.lock().fail_on_commit = Some(n);
        self
    }

    /// Get a handle for inspecting the store
    pub fn handle(&self) -> MemoryStoreHandle {
        MemoryStoreHandle {
            state: self.state.clone(),
        }
    }
}

impl KvStore for MemoryStore {
    fn write_batch(&mut self, entries: &[NormalizedEntry]) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let attempt = state.commits.len() + 1;
        if state.fail_on_commit == Some(attempt) {
            return Err(StoreError::Backend(format!(
                "injected failure on commit {}",
                attempt
            )));
        }

        for entry in entries {
            state.data.insert(entry.key.clone(), entry.value.clone());
        }
        state.commits.push(entries.len());
        Ok(())
    }

    fn close(self) -> Result<(), StoreError> {
        self.state.lock().closes += 1;
        Ok(())
    }
}

impl MemoryStoreHandle {
    /// Look up a committed value
    pub fn get(&self, key: &str) -> Option<String> {
        self.state.lock().data.get(key).cloned()
    }

    /// Number of committed keys
    pub fn len(&self) -> usize {
        self.state.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all committed pairs, sorted by key
    pub fn entries(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Sizes of successful commits, in order
    pub fn commits(&self) -> Vec<usize> {
        self.state.lock().commits.clone()
    }

    /// How many times the store was closed
    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }
}
