use std::collections::HashSet;
use tempfile::tempdir;

mod common;

#[test]
fn test_generate_accounts_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("accounts.csv");
    common::write_accounts_csv(&path, &[10, 20, 30]).expect("Failed to generate CSV");

    let content = std::fs::read_to_string(&path).expect("Failed to read file");
    assert_eq!(
        content,
        "owner,currency,balance\nowner1,USD,10\nowner2,USD,20\nowner3,USD,30\n"
    );
}

#[test]
fn test_generate_transfers_distribution() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transfers.csv");
    common::generate_transfers_csv(&path, 4, 100, 7).expect("Failed to generate CSV");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .expect("Failed to open CSV");

    let mut pairs = HashSet::new();
    let mut rows = 0;
    for result in reader.records() {
        let record = result.expect("Failed to read record");
        let from: i64 = record[0].parse().expect("Failed to parse from id");
        let to: i64 = record[1].parse().expect("Failed to parse to id");
        assert!((1..=4).contains(&from));
        assert!((1..=4).contains(&to));
        assert_ne!(from, to);
        assert_eq!(&record[2], "7");
        pairs.insert((from, to));
        rows += 1;
    }

    assert_eq!(rows, 100);
    // Every ordered pair of distinct accounts shows up.
    assert_eq!(pairs.len(), 12);
}
