use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Transfers CSV file (from_account_id, to_account_id, amount)
    pub transfers: PathBuf,

    /// Accounts CSV file (owner, currency, balance) created before any transfer runs
    #[arg(long)]
    pub accounts: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "LEDGER_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// How long a transaction waits for an account row lock before giving up
    #[arg(long, env = "LEDGER_LOCK_TIMEOUT_MS", default_value_t = DEFAULT_LOCK_TIMEOUT_MS)]
    pub lock_timeout_ms: u64,

    /// Number of transfers kept in flight at once
    #[arg(long, env = "LEDGER_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,
}

impl Cli {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
        }
    }
}

/// Settings shared by every `LedgerStore` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub lock_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        }
    }
}
