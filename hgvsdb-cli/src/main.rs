//! hgvsdb loader - bulk loads HGVS to CA ID mappings into RocksDB

use anyhow::Context;
use clap::Parser;
use hgvsdb_core::config;
use hgvsdb_core::loader::{LoadConfig, Loader};
use hgvsdb_core::store::StoreConfig;
use hgvsdb_core::writer::WriterConfig;
use hgvsdb_core::{LoadError, Stage};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status for a run stopped by SIGINT
const EXIT_INTERRUPTED: u8 = 130;

/// Exit status for any other fatal error
const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "hgvsdb-load")]
#[command(about = "Load a gzip NDJSON dump of HGVS to CA ID mappings into RocksDB")]
#[command(version = hgvsdb_core::VERSION)]
struct Cli {
    /// gzip-compressed newline-delimited JSON input
    #[arg(long)]
    input: PathBuf,

    /// RocksDB directory to create or update
    #[arg(long)]
    output: PathBuf,

    /// Entries per committed batch
    #[arg(long, default_value_t = config::DEFAULT_BATCH_SIZE as u64,
          value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,

    /// Lines between progress markers (0 disables them)
    #[arg(long, default_value_t = config::PROGRESS_INTERVAL)]
    progress_interval: u64,

    /// RocksDB write buffer size in bytes
    #[arg(long, default_value_t = config::WRITE_BUFFER_SIZE)]
    write_buffer_size: usize,

    /// Maximum number of RocksDB files held open
    #[arg(long, default_value_t = config::MAX_OPEN_FILES)]
    max_open_files: i32,

    /// Print the load report as JSON on stdout
    #[arg(long)]
    json_summary: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<LoadConfig> {
        let batch_size = usize::try_from(self.batch_size)
            .context("batch size does not fit in memory on this platform")?;

        Ok(LoadConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            writer: WriterConfig { batch_size },
            store: StoreConfig {
                write_buffer_size: self.write_buffer_size,
                max_open_files: self.max_open_files,
                ..Default::default()
            },
            progress_interval: self.progress_interval,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<LoadError>().map(LoadError::stage) {
                Some(Stage::Interrupted) => warn!("{}", e),
                Some(stage) => error!("Load failed ({}): {}", stage, e),
                None => error!("Load failed: {}", e),
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Process exit status for a failed run
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<LoadError>().map(LoadError::stage) {
        Some(Stage::Interrupted) => EXIT_INTERRUPTED,
        _ => EXIT_FAILURE,
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install interrupt handler")?;

    let loader = Loader::new(cli.load_config()?).with_interrupt(interrupt);
    let report = loader.run()?;

    info!(
        "Loaded {} entries from {:?} into {:?}",
        report.entries_written, report.input, report.output
    );

    if cli.json_summary {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
