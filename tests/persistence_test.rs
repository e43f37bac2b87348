#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: open two accounts and move money between them
    let mut accounts = tempfile::NamedTempFile::new().unwrap();
    writeln!(accounts, "owner,currency,balance").unwrap();
    writeln!(accounts, "alice,USD,100").unwrap();
    writeln!(accounts, "bob,USD,100").unwrap();

    let mut transfers1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(transfers1, "from_account_id,to_account_id,amount").unwrap();
    writeln!(transfers1, "1,2,40").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("simple-bank-ledger"));
    cmd1.arg(transfers1.path())
        .arg("--accounts")
        .arg(accounts.path())
        .arg("--db-path")
        .arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,alice,USD,60"));
    assert!(stdout1.contains("2,bob,USD,140"));

    // 2. Second run: only transfers, against the same DB path
    let mut transfers2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(transfers2, "from_account_id,to_account_id,amount").unwrap();
    writeln!(transfers2, "2,1,15").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("simple-bank-ledger"));
    cmd2.arg(transfers2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // Balances from the first run were recovered before the new transfer
    assert!(stdout2.contains("1,alice,USD,75"));
    assert!(stdout2.contains("2,bob,USD,125"));
}
