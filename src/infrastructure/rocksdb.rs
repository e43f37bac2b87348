use crate::config::StoreOptions;
use crate::domain::account::{Account, CreateAccountParams, ListAccountsParams};
use crate::domain::entry::{CreateEntryParams, Entry, ListEntriesParams};
use crate::domain::ports::{LedgerStore, LedgerTx, LedgerTxBox};
use crate::domain::transfer::{CreateTransferParams, ListTransfersParams, Transfer};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, Transaction, TransactionDB,
    TransactionDBOptions, TransactionOptions, WriteOptions,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{mpsc, oneshot};

/// Column Family for storing accounts.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for storing ledger entries.
pub const CF_ENTRIES: &str = "entries";
/// Column Family for storing transfers.
pub const CF_TRANSFERS: &str = "transfers";

struct Sequences {
    account: AtomicI64,
    entry: AtomicI64,
    transfer: AtomicI64,
}

/// A persistent ledger store on a RocksDB pessimistic `TransactionDB`.
///
/// Keys are big-endian ids so column family iteration runs in id order.
/// Values are JSON. Balance updates go through `get_for_update`, which takes
/// an exclusive row lock held until the RocksDB transaction ends; RocksDB's
/// lock manager handles waiting, timeouts and deadlock detection.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<TransactionDB>,
    sequences: Arc<Sequences>,
    options: StoreOptions,
}

fn internal(message: impl Into<String>) -> LedgerError {
    LedgerError::InternalError(Box::new(std::io::Error::other(message.into())))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| internal(format!("Serialization error: {}", e)))
}

/// Highest id stored in `cf_name`, or 0 when the column family is empty.
fn last_id(db: &TransactionDB, cf_name: &str) -> Result<i64> {
    let cf = db
        .cf_handle(cf_name)
        .ok_or_else(|| internal(format!("{} column family not found", cf_name)))?;
    match db.iterator_cf(cf, IteratorMode::End).next() {
        Some(item) => {
            let (key, _value) = item?;
            let bytes: [u8; 8] = key
                .as_ref()
                .try_into()
                .map_err(|_| internal(format!("Malformed key in {}", cf_name)))?;
            Ok(i64::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| internal(format!("Deserialization error: {}", e)))
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures the column families exist and resumes each id sequence after
    /// the highest key already stored.
    pub fn open<P: AsRef<Path>>(path: P, options: StoreOptions) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let lock_timeout_ms = i64::try_from(options.lock_timeout.as_millis()).unwrap_or(i64::MAX);
        let mut txn_db_opts = TransactionDBOptions::default();
        txn_db_opts.set_txn_lock_timeout(lock_timeout_ms);

        let cfs = [CF_ACCOUNTS, CF_ENTRIES, CF_TRANSFERS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));
        let db: TransactionDB = TransactionDB::open_cf_descriptors(&opts, &txn_db_opts, path, cfs)?;

        let sequences = Sequences {
            account: AtomicI64::new(last_id(&db, CF_ACCOUNTS)? + 1),
            entry: AtomicI64::new(last_id(&db, CF_ENTRIES)? + 1),
            transfer: AtomicI64::new(last_id(&db, CF_TRANSFERS)? + 1),
        };
        let store = Self {
            db: Arc::new(db),
            sequences: Arc::new(sequences),
            options,
        };

        tracing::info!(
            next_account_id = store.sequences.account.load(Ordering::SeqCst),
            "opened rocksdb ledger"
        );
        Ok(store)
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| internal(format!("{} column family not found", name)))
    }

    fn get_row<T: DeserializeOwned>(&self, cf_name: &str, id: i64) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            rows.push(decode(&value)?);
        }
        Ok(rows)
    }

    fn transaction_options(&self) -> TransactionOptions {
        let mut txn_opts = TransactionOptions::default();
        txn_opts.set_deadlock_detect(true);
        txn_opts.set_lock_timeout(
            i64::try_from(self.options.lock_timeout.as_millis()).unwrap_or(i64::MAX),
        );
        txn_opts
    }

    fn tx_get_account(&self, txn: &Transaction<TransactionDB>, id: i64) -> Result<Account> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let bytes = txn
            .get_cf(cf, id.to_be_bytes())?
            .ok_or_else(|| LedgerError::account_not_found(id))?;
        decode(&bytes)
    }

    fn tx_add_account_balance(
        &self,
        txn: &Transaction<TransactionDB>,
        id: i64,
        delta: i64,
    ) -> Result<Account> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let key = id.to_be_bytes();
        let bytes = txn
            .get_for_update_cf(cf, key, true)?
            .ok_or_else(|| LedgerError::account_not_found(id))?;

        let mut account: Account = decode(&bytes)?;
        account.apply_delta(delta)?;
        txn.put_cf(cf, key, encode(&account)?)?;
        Ok(account)
    }

    fn tx_ensure_account(&self, txn: &Transaction<TransactionDB>, id: i64) -> Result<()> {
        let cf = self.cf(CF_ACCOUNTS)?;
        match txn.get_cf(cf, id.to_be_bytes())? {
            Some(_) => Ok(()),
            None => Err(LedgerError::account_not_found(id)),
        }
    }

    fn tx_create_entry(
        &self,
        txn: &Transaction<TransactionDB>,
        params: CreateEntryParams,
    ) -> Result<Entry> {
        self.tx_ensure_account(txn, params.account_id)?;

        let entry = Entry {
            id: self.sequences.entry.fetch_add(1, Ordering::SeqCst),
            account_id: params.account_id,
            amount: params.amount,
            created_at: Utc::now(),
        };
        txn.put_cf(self.cf(CF_ENTRIES)?, entry.id.to_be_bytes(), encode(&entry)?)?;
        Ok(entry)
    }

    fn tx_create_transfer(
        &self,
        txn: &Transaction<TransactionDB>,
        params: CreateTransferParams,
    ) -> Result<Transfer> {
        self.tx_ensure_account(txn, params.from_account_id)?;
        self.tx_ensure_account(txn, params.to_account_id)?;

        let transfer = Transfer {
            id: self.sequences.transfer.fetch_add(1, Ordering::SeqCst),
            from_account_id: params.from_account_id,
            to_account_id: params.to_account_id,
            amount: params.amount,
            created_at: Utc::now(),
        };
        txn.put_cf(
            self.cf(CF_TRANSFERS)?,
            transfer.id.to_be_bytes(),
            encode(&transfer)?,
        )?;
        Ok(transfer)
    }

    /// Owns one RocksDB transaction for its whole life, applying commands as
    /// they arrive. The transaction is rolled back if the channel closes
    /// before a commit.
    fn run_transaction(self, mut commands: mpsc::Receiver<TxCommand>) {
        let txn = self
            .db
            .transaction_opt(&WriteOptions::default(), &self.transaction_options());
        let mut ending = None;

        while let Some(command) = commands.blocking_recv() {
            match command {
                TxCommand::GetAccount { id, reply } => {
                    let _ = reply.send(self.tx_get_account(&txn, id));
                }
                TxCommand::AddAccountBalance { id, delta, reply } => {
                    let _ = reply.send(self.tx_add_account_balance(&txn, id, delta));
                }
                TxCommand::CreateEntry { params, reply } => {
                    let _ = reply.send(self.tx_create_entry(&txn, params));
                }
                TxCommand::CreateTransfer { params, reply } => {
                    let _ = reply.send(self.tx_create_transfer(&txn, params));
                }
                TxCommand::Commit { reply } => {
                    ending = Some((true, reply));
                    break;
                }
                TxCommand::Rollback { reply } => {
                    ending = Some((false, reply));
                    break;
                }
            }
        }

        let (commit, reply) = match ending {
            Some((commit, reply)) => (commit, Some(reply)),
            None => (false, None),
        };
        let outcome = if commit {
            txn.commit()
        } else {
            let outcome = txn.rollback();
            drop(txn);
            outcome
        };
        // Release the database handle before the caller hears the
        // transaction is over, so a close and reopen cannot race this worker.
        drop(self);

        match reply {
            Some(reply) => {
                let _ = reply.send(outcome.map_err(LedgerError::from));
            }
            None => {
                if let Err(e) = outcome {
                    tracing::error!(error = %e, "rollback of abandoned transaction failed");
                }
            }
        }
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn create_account(&self, params: CreateAccountParams) -> Result<Account> {
        let account = Account {
            id: self.sequences.account.fetch_add(1, Ordering::SeqCst),
            owner: params.owner,
            currency: params.currency,
            balance: params.balance,
        };
        self.db.put_cf(
            self.cf(CF_ACCOUNTS)?,
            account.id.to_be_bytes(),
            encode(&account)?,
        )?;
        Ok(account)
    }

    async fn get_account(&self, id: i64) -> Result<Account> {
        self.get_row(CF_ACCOUNTS, id)?
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>> {
        let accounts: Vec<Account> = self.scan(CF_ACCOUNTS)?;
        Ok(accounts
            .into_iter()
            .filter(|account| account.owner == params.owner)
            .skip(params.offset)
            .take(params.limit)
            .collect())
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        self.scan(CF_ACCOUNTS)
    }

    async fn get_entry(&self, id: i64) -> Result<Entry> {
        self.get_row(CF_ENTRIES, id)?
            .ok_or_else(|| LedgerError::entry_not_found(id))
    }

    async fn list_entries(&self, params: ListEntriesParams) -> Result<Vec<Entry>> {
        let entries: Vec<Entry> = self.scan(CF_ENTRIES)?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.account_id == params.account_id)
            .skip(params.offset)
            .take(params.limit)
            .collect())
    }

    async fn get_transfer(&self, id: i64) -> Result<Transfer> {
        self.get_row(CF_TRANSFERS, id)?
            .ok_or_else(|| LedgerError::transfer_not_found(id))
    }

    async fn list_transfers(&self, params: ListTransfersParams) -> Result<Vec<Transfer>> {
        let transfers: Vec<Transfer> = self.scan(CF_TRANSFERS)?;
        Ok(transfers
            .into_iter()
            .filter(|transfer| {
                transfer.from_account_id == params.from_account_id
                    || transfer.to_account_id == params.to_account_id
            })
            .skip(params.offset)
            .take(params.limit)
            .collect())
    }

    async fn begin(&self) -> Result<LedgerTxBox> {
        let (commands, receiver) = mpsc::channel(1);
        let store = self.clone();
        // Lock waits block inside RocksDB, so each transaction gets its own
        // blocking worker rather than an async task.
        tokio::task::spawn_blocking(move || store.run_transaction(receiver));
        Ok(Box::new(RocksDBTx { commands }))
    }
}

enum TxCommand {
    GetAccount {
        id: i64,
        reply: oneshot::Sender<Result<Account>>,
    },
    AddAccountBalance {
        id: i64,
        delta: i64,
        reply: oneshot::Sender<Result<Account>>,
    },
    CreateEntry {
        params: CreateEntryParams,
        reply: oneshot::Sender<Result<Entry>>,
    },
    CreateTransfer {
        params: CreateTransferParams,
        reply: oneshot::Sender<Result<Transfer>>,
    },
    Commit {
        reply: oneshot::Sender<Result<()>>,
    },
    Rollback {
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Transaction handle for [`RocksDBStore`].
///
/// Forwards each call to the worker that owns the RocksDB transaction.
/// Dropping the handle closes the channel, which rolls the transaction back.
pub struct RocksDBTx {
    commands: mpsc::Sender<TxCommand>,
}

impl RocksDBTx {
    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> TxCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| LedgerError::TransactionClosed)?;
        response.await.map_err(|_| LedgerError::TransactionClosed)?
    }
}

#[async_trait]
impl LedgerTx for RocksDBTx {
    async fn get_account(&mut self, id: i64) -> Result<Account> {
        self.call(|reply| TxCommand::GetAccount { id, reply }).await
    }

    async fn add_account_balance(&mut self, id: i64, delta: i64) -> Result<Account> {
        self.call(|reply| TxCommand::AddAccountBalance { id, delta, reply })
            .await
    }

    async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry> {
        self.call(|reply| TxCommand::CreateEntry { params, reply })
            .await
    }

    async fn create_transfer(&mut self, params: CreateTransferParams) -> Result<Transfer> {
        self.call(|reply| TxCommand::CreateTransfer { params, reply })
            .await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.call(|reply| TxCommand::Commit { reply }).await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.call(|reply| TxCommand::Rollback { reply }).await
    }
}
