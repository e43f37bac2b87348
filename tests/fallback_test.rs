use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

fn transfers_csv() -> tempfile::NamedTempFile {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "from_account_id,to_account_id,amount").unwrap();
    csv
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let csv = transfers_csv();
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("simple-bank-ledger"));
    cmd.arg(csv.path())
        .arg("--db-path")
        .arg(dir.path().join("some_db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."));
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_db_path_from_environment() {
    let csv = transfers_csv();
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("simple-bank-ledger"));
    cmd.arg(csv.path())
        .env("LEDGER_DB_PATH", dir.path().join("some_db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back to in-memory storage"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let csv = transfers_csv();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("simple-bank-ledger"));
    cmd.arg(csv.path()).arg("--db-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
