#![allow(dead_code)]

use rand::Rng;
use rand::distributions::Alphanumeric;
use simple_bank_ledger::domain::account::{Account, CreateAccountParams, Currency};
use simple_bank_ledger::domain::ports::LedgerStore;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn random_owner() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

pub fn random_money() -> i64 {
    rand::thread_rng().gen_range(1..=1000)
}

pub async fn create_random_account(store: &dyn LedgerStore) -> Account {
    let params = CreateAccountParams {
        owner: random_owner(),
        currency: Currency::Usd,
        balance: random_money(),
    };
    let account = store.create_account(params.clone()).await.unwrap();

    assert_eq!(account.owner, params.owner);
    assert_eq!(account.currency, params.currency);
    assert_eq!(account.balance, params.balance);
    assert!(account.id > 0);
    account
}

pub fn write_accounts_csv(path: &Path, balances: &[i64]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["owner", "currency", "balance"])?;
    for (i, balance) in balances.iter().enumerate() {
        wtr.write_record([format!("owner{}", i + 1), "USD".to_string(), balance.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `rows` transfers cycling through every ordered pair of the first
/// `accounts` account ids, each moving `amount`.
pub fn generate_transfers_csv(
    path: &Path,
    accounts: i64,
    rows: usize,
    amount: i64,
) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["from_account_id", "to_account_id", "amount"])?;

    let pairs: Vec<(i64, i64)> = (1..=accounts)
        .flat_map(|from| (1..=accounts).map(move |to| (from, to)))
        .filter(|(from, to)| from != to)
        .collect();

    for (from, to) in pairs.iter().cycle().take(rows) {
        wtr.write_record([from.to_string(), to.to_string(), amount.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}
