//! Error types for hgvsdb

use crate::store::StoreError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hgvsdb operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Fatal, run-aborting errors.
///
/// Problems confined to a single input line are not errors; they surface as
/// [`crate::Classification::Skipped`] instead.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Input file could not be opened
    #[error("Failed to open input {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not gzip-compressed
    #[error("Input {} is not a gzip file: {reason}", .path.display())]
    InputFormat { path: PathBuf, reason: String },

    /// Decompression or read failure in the middle of the stream
    #[error("Failed to read input at line {line}: {source}")]
    ReadInput {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    /// Store could not be opened or created
    #[error("Failed to open store at {}: {source}", .path.display())]
    OpenStore {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// Batch commit failed
    #[error("Failed to commit batch {batch} ({entries} entries): {source}")]
    Commit {
        batch: u64,
        entries: usize,
        #[source]
        source: StoreError,
    },

    /// Store did not shut down cleanly
    #[error("Failed to close store: {source}")]
    CloseStore {
        #[source]
        source: StoreError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Run stopped by an external interrupt
    #[error("Load interrupted after {lines} lines")]
    Interrupted { lines: u64 },
}

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configure,
    OpenInput,
    ReadInput,
    OpenStore,
    CommitBatch,
    CloseStore,
    Interrupted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configure => "configure",
            Stage::OpenInput => "open input",
            Stage::ReadInput => "read input",
            Stage::OpenStore => "open store",
            Stage::CommitBatch => "commit batch",
            Stage::CloseStore => "close store",
            Stage::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

impl LoadError {
    /// Stage of the pipeline that failed
    pub fn stage(&self) -> Stage {
        match self {
            LoadError::OpenInput { .. } | LoadError::InputFormat { .. } => Stage::OpenInput,
            LoadError::ReadInput { .. } => Stage::ReadInput,
            LoadError::OpenStore { .. } => Stage::OpenStore,
            LoadError::Commit { .. } => Stage::CommitBatch,
            LoadError::CloseStore { .. } => Stage::CloseStore,
            LoadError::Config(_) => Stage::Configure,
            LoadError::Interrupted { .. } => Stage::Interrupted,
        }
    }
}
