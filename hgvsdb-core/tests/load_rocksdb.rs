//! End-to-end loads from gzip files into RocksDB

use flate2::write::GzEncoder;
use flate2::Compression;
use hgvsdb_core::loader::{LoadConfig, Loader};
use hgvsdb_core::{LoadError, Stage};
use rocksdb::DB;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_input(dir: &TempDir, lines: &[String]) -> PathBuf {
    let path = dir.path().join("variants.json.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::fast());
    for line in lines {
        writeln!(encoder, "{}", line).unwrap();
    }
    encoder.finish().unwrap();
    path
}

fn record(hgvs: &str, ca_id: &str) -> String {
    format!(r#"{{"hgvs":"{}","ca_id":"{}"}}"#, hgvs, ca_id)
}

fn get(db: &DB, key: &str) -> Option<String> {
    db.get(key.as_bytes())
        .unwrap()
        .map(|v| String::from_utf8(v).unwrap())
}

fn count(path: &Path) -> usize {
    let db = DB::open_default(path).unwrap();
    db.iterator(rocksdb::IteratorMode::Start).count()
}

#[test]
fn test_load_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(
        &temp_dir,
        &[
            r#"{"hgvs":"NM_000001.1:c.1A>T","ca_id":"CA123"}"#.to_string(),
            r#"{"hgvs":" NM_000002.1:c.2G>C ","ca_id":" "}"#.to_string(),
            "not json".to_string(),
            r#"{"ca_id":"CA999"}"#.to_string(),
        ],
    );
    let output = temp_dir.path().join("hgvs.db");

    let report = Loader::new(LoadConfig::new(&input, &output)).run().unwrap();
    assert_eq!(report.lines_read, 4);
    assert_eq!(report.entries_written, 2);
    assert_eq!(report.skipped.total(), 2);

    let db = DB::open_default(&output).unwrap();
    assert_eq!(get(&db, "NM_000001.1:c.1A>T").as_deref(), Some("CA123"));
    assert_eq!(get(&db, "NM_000002.1:c.2G>C").as_deref(), Some("NULL"));
    drop(db);
    assert_eq!(count(&output), 2);
}

#[test]
fn test_load_in_small_batches() {
    let temp_dir = TempDir::new().unwrap();
    let mut lines: Vec<String> = (0..1000)
        .map(|i| record(&format!("NC_000001.11:g.{}A>G", i), &format!("CA{}", i)))
        .collect();
    // Same key in a later batch
    lines.push(record("NC_000001.11:g.0A>G", "CA_LAST"));
    let input = write_input(&temp_dir, &lines);
    let output = temp_dir.path().join("hgvs.db");

    let config = LoadConfig::new(&input, &output)
        .with_batch_size(64)
        .with_progress_interval(100);
    let report = Loader::new(config).run().unwrap();

    assert_eq!(report.lines_read, 1001);
    assert_eq!(report.entries_written, 1001);
    assert_eq!(report.batches_committed, 16);
    assert_eq!(count(&output), 1000);

    let db = DB::open_default(&output).unwrap();
    assert_eq!(get(&db, "NC_000001.11:g.0A>G").as_deref(), Some("CA_LAST"));
    assert_eq!(get(&db, "NC_000001.11:g.999A>G").as_deref(), Some("CA999"));
}

#[test]
fn test_load_into_existing_store() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hgvs.db");

    let first = write_input(&temp_dir, &[record("a", "CA1"), record("b", "CA2")]);
    Loader::new(LoadConfig::new(&first, &output)).run().unwrap();

    let second = write_input(&temp_dir, &[record("b", "CA3"), record("c", "CA4")]);
    Loader::new(LoadConfig::new(&second, &output)).run().unwrap();

    let db = DB::open_default(&output).unwrap();
    assert_eq!(get(&db, "a").as_deref(), Some("CA1"));
    assert_eq!(get(&db, "b").as_deref(), Some("CA3"));
    assert_eq!(get(&db, "c").as_deref(), Some("CA4"));
}

#[test]
fn test_missing_input_creates_no_store() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hgvs.db");

    let err = Loader::new(LoadConfig::new(temp_dir.path().join("absent.gz"), &output))
        .run()
        .unwrap_err();

    assert!(matches!(err, LoadError::OpenInput { .. }));
    assert_eq!(err.stage(), Stage::OpenInput);
    assert!(!output.exists());
}

#[test]
fn test_uncompressed_input_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("variants.json");
    std::fs::write(&input, record("a", "CA1")).unwrap();

    let err = Loader::new(LoadConfig::new(&input, temp_dir.path().join("hgvs.db")))
        .run()
        .unwrap_err();
    assert!(matches!(err, LoadError::InputFormat { .. }));
}

#[test]
fn test_store_open_failure() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &[record("a", "CA1")]);
    // A regular file where the store directory should be
    let output = temp_dir.path().join("not-a-dir");
    std::fs::write(&output, b"occupied").unwrap();

    let err = Loader::new(LoadConfig::new(&input, &output)).run().unwrap_err();
    assert_eq!(err.stage(), Stage::OpenStore);
}

#[test]
fn test_store_is_released_after_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, &[record("a", "CA1")]);
    let output = temp_dir.path().join("hgvs.db");

    Loader::new(LoadConfig::new(&input, &output)).run().unwrap();
    // Would fail on the LOCK file if the handle were still open
    Loader::new(LoadConfig::new(&input, &output)).run().unwrap();
}
