//! Loader - drives the ingestion pipeline
//!
//! Reads lines from the source, classifies each one, and routes accepted
//! entries to the batch writer. Whatever way the run ends, the pending
//! batch is committed and the store is closed before returning.

use crate::normalize::classify_line;
use crate::source::GzipLineSource;
use crate::store::{KvStore, StoreConfig};
use crate::writer::{BatchWriter, WriterConfig, WriterStats};
use crate::{Classification, LoadError, Result, SkipCounts};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Loader configuration
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// gzip-compressed NDJSON input
    pub input: PathBuf,
    /// Store directory
    pub output: PathBuf,
    /// Batch writer configuration
    pub writer: WriterConfig,
    /// Store configuration
    pub store: StoreConfig,
    /// Lines between progress markers (0 disables them)
    pub progress_interval: u64,
}

impl LoadConfig {
    /// Create a configuration with default tuning
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            writer: WriterConfig::default(),
            store: StoreConfig::default(),
            progress_interval: crate::config::PROGRESS_INTERVAL,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.writer.batch_size = batch_size;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Summary of a finished load
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub lines_read: u64,
    pub entries_written: u64,
    pub batches_committed: u64,
    pub skipped: SkipCounts,
    pub elapsed_secs: f64,
}

/// Progress of a single drive loop
#[derive(Debug, Default)]
struct DriveState {
    lines: u64,
    skipped: SkipCounts,
}

/// Bulk loader from a gzip NDJSON file into RocksDB
pub struct Loader {
    config: LoadConfig,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Loader {
    pub fn new(config: LoadConfig) -> Self {
        Self {
            config,
            interrupt: None,
        }
    }

    /// Stop the run (committing pending entries) once `flag` is set
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Run the full load: open input, open store, stream, close
    pub fn run(&self) -> Result<LoadReport> {
        self.config.writer.validate()?;
        info!(
            "Starting load from {} to {}",
            self.config.input.display(),
            self.config.output.display()
        );

        // Input first: a bad input file must not leave an empty store behind
        let source = GzipLineSource::open(&self.config.input)?;
        let writer = BatchWriter::open(
            &self.config.output,
            &self.config.store,
            self.config.writer.clone(),
        )?;

        self.drive(source, writer)
    }

    /// Push every line through the normalizer into `writer`, then finish
    /// and close it.
    ///
    /// The writer is always finished and closed, including when the input
    /// fails, a commit fails, or the run is interrupted. Entries accepted
    /// before an input error or interrupt are still committed. The first
    /// error encountered is returned.
    pub fn drive<I, S>(&self, lines: I, mut writer: BatchWriter<S>) -> Result<LoadReport>
    where
        I: IntoIterator<Item = Result<Vec<u8>>>,
        S: KvStore,
    {
        let start = Instant::now();
        let mut state = DriveState::default();

        let outcome = self.feed(lines, &mut writer, &mut state);
        let finished = writer.finish();
        let closed = writer.close();

        let stats = match (outcome, finished, closed) {
            (Ok(()), Ok(()), Ok(stats)) => stats,
            (Err(e), finished, closed) => {
                if let Err(e) = finished {
                    warn!("Failed to commit final batch after error: {}", e);
                }
                if let Err(e) = closed {
                    warn!("Failed to close store after error: {}", e);
                }
                return Err(e);
            }
            (Ok(()), Err(e), closed) => {
                if let Err(e) = closed {
                    warn!("Failed to close store after error: {}", e);
                }
                return Err(e);
            }
            (Ok(()), Ok(()), Err(e)) => return Err(e),
        };

        let report = self.report(&state, stats, start);
        info!("Finished processing {} lines.", report.lines_read);
        info!(
            "Wrote {} entries in {} batches, skipped {} lines ({:.1}s)",
            report.entries_written,
            report.batches_committed,
            report.skipped.total(),
            report.elapsed_secs
        );
        Ok(report)
    }

    fn feed<I, S>(
        &self,
        lines: I,
        writer: &mut BatchWriter<S>,
        state: &mut DriveState,
    ) -> Result<()>
    where
        I: IntoIterator<Item = Result<Vec<u8>>>,
        S: KvStore,
    {
        let interval = self.config.progress_interval;

        for (idx, line) in lines.into_iter().enumerate() {
            let idx = idx as u64;
            if interval > 0 && idx > 0 && idx % interval == 0 {
                info!("Processing line {}", idx);
            }

            if self.interrupted() {
                return Err(LoadError::Interrupted { lines: state.lines });
            }

            let line = line?;
            state.lines += 1;

            match classify_line(&line) {
                Classification::Accepted(entry) => writer.accept(entry)?,
                Classification::Skipped(reason) => state.skipped.record(reason),
            }
        }

        Ok(())
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    fn report(&self, state: &DriveState, stats: WriterStats, start: Instant) -> LoadReport {
        LoadReport {
            input: self.config.input.clone(),
            output: self.config.output.clone(),
            lines_read: state.lines,
            entries_written: stats.entries_written,
            batches_committed: stats.batches_committed,
            skipped: state.skipped,
            elapsed_secs: start.elapsed().as_secs_f64(),
        }
    }
}
