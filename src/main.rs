use clap::Parser;
use futures::stream::{self, StreamExt};
use miette::{IntoDiagnostic, Result};
use simple_bank_ledger::config::Cli;
use simple_bank_ledger::domain::account::Amount;
use simple_bank_ledger::domain::ports::LedgerStoreBox;
use simple_bank_ledger::domain::transfer::TransferTxParams;
use simple_bank_ledger::infrastructure::in_memory::InMemoryLedgerStore;
#[cfg(feature = "storage-rocksdb")]
use simple_bank_ledger::infrastructure::rocksdb::RocksDBStore;
use simple_bank_ledger::interfaces::csv::account_reader::AccountReader;
use simple_bank_ledger::interfaces::csv::account_writer::AccountWriter;
use simple_bank_ledger::interfaces::csv::transfer_reader::TransferReader;
use simple_bank_ledger::{TransferEngine, logging};
use std::fs::File;
use std::io;

fn open_store(cli: &Cli) -> Result<LedgerStoreBox> {
    let options = cli.store_options();
    match &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => {
            let store = RocksDBStore::open(db_path, options).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryLedgerStore::with_options(options)))
        }
        None => Ok(Box::new(InMemoryLedgerStore::with_options(options))),
    }
}

fn validate(params: TransferTxParams) -> simple_bank_ledger::Result<TransferTxParams> {
    Amount::new(params.amount)?;
    Ok(params)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let engine = TransferEngine::new(open_store(&cli)?);

    if let Some(accounts_path) = &cli.accounts {
        let file = File::open(accounts_path).into_diagnostic()?;
        for params in AccountReader::new(file).accounts() {
            match params {
                Ok(params) => {
                    let account = engine
                        .store()
                        .create_account(params)
                        .await
                        .into_diagnostic()?;
                    tracing::debug!(id = account.id, owner = %account.owner, "opened account");
                }
                Err(e) => tracing::error!("Error reading account: {}", e),
            }
        }
    }

    let file = File::open(&cli.transfers).into_diagnostic()?;
    let requests =
        TransferReader::new(file)
            .transfers()
            .filter_map(|record| match record.and_then(validate) {
                Ok(params) => Some(params),
                Err(e) => {
                    tracing::error!("Error reading transfer: {}", e);
                    None
                }
            });

    let engine = &engine;
    stream::iter(requests)
        .map(|params| async move { (params, engine.transfer_tx(params).await) })
        .buffer_unordered(cli.concurrency.max(1))
        .for_each(|(params, outcome)| async move {
            if let Err(e) = outcome {
                tracing::error!(
                    from = params.from_account_id,
                    to = params.to_account_id,
                    amount = params.amount,
                    "Error processing transfer: {}",
                    e
                );
            }
        })
        .await;

    let accounts = engine.store().all_accounts().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}
