use crate::config::StoreOptions;
use crate::domain::account::{Account, CreateAccountParams, ListAccountsParams};
use crate::domain::entry::{CreateEntryParams, Entry, ListEntriesParams};
use crate::domain::ports::{LedgerStore, LedgerTx, LedgerTxBox};
use crate::domain::transfer::{CreateTransferParams, ListTransfersParams, Transfer};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Committed rows, keyed by id so iteration is in id order.
#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    entries: BTreeMap<i64, Entry>,
    transfers: BTreeMap<i64, Transfer>,
}

struct Shared {
    tables: RwLock<Tables>,
    /// One lock per account row. Held by a transaction from its first balance
    /// update on that account until it commits or rolls back.
    row_locks: RwLock<HashMap<i64, Arc<Mutex<()>>>>,
    next_account_id: AtomicI64,
    next_entry_id: AtomicI64,
    next_transfer_id: AtomicI64,
    options: StoreOptions,
}

/// A thread-safe in-memory ledger with row-level locking.
///
/// Reads always see committed data. Transactions stage their writes and apply
/// them under a single write lock on commit, so a transfer's rows and both
/// balance changes become visible together. Ids come from sequences that are
/// not rewound on rollback.
#[derive(Clone)]
pub struct InMemoryLedgerStore {
    shared: Arc<Shared>,
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                tables: RwLock::new(Tables::default()),
                row_locks: RwLock::new(HashMap::new()),
                next_account_id: AtomicI64::new(1),
                next_entry_id: AtomicI64::new(1),
                next_transfer_id: AtomicI64::new(1),
                options,
            }),
        }
    }
}

fn page<T>(rows: impl Iterator<Item = T>, limit: usize, offset: usize) -> Vec<T> {
    rows.skip(offset).take(limit).collect()
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_account(&self, params: CreateAccountParams) -> Result<Account> {
        let account = Account {
            id: self.shared.next_account_id.fetch_add(1, Ordering::SeqCst),
            owner: params.owner,
            currency: params.currency,
            balance: params.balance,
        };

        self.shared
            .row_locks
            .write()
            .await
            .insert(account.id, Arc::new(Mutex::new(())));
        self.shared
            .tables
            .write()
            .await
            .accounts
            .insert(account.id, account.clone());

        Ok(account)
    }

    async fn get_account(&self, id: i64) -> Result<Account> {
        let tables = self.shared.tables.read().await;
        tables
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>> {
        let tables = self.shared.tables.read().await;
        let rows = tables
            .accounts
            .values()
            .filter(|account| account.owner == params.owner)
            .cloned();
        Ok(page(rows, params.limit, params.offset))
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        let tables = self.shared.tables.read().await;
        Ok(tables.accounts.values().cloned().collect())
    }

    async fn get_entry(&self, id: i64) -> Result<Entry> {
        let tables = self.shared.tables.read().await;
        tables
            .entries
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::entry_not_found(id))
    }

    async fn list_entries(&self, params: ListEntriesParams) -> Result<Vec<Entry>> {
        let tables = self.shared.tables.read().await;
        let rows = tables
            .entries
            .values()
            .filter(|entry| entry.account_id == params.account_id)
            .cloned();
        Ok(page(rows, params.limit, params.offset))
    }

    async fn get_transfer(&self, id: i64) -> Result<Transfer> {
        let tables = self.shared.tables.read().await;
        tables
            .transfers
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::transfer_not_found(id))
    }

    async fn list_transfers(&self, params: ListTransfersParams) -> Result<Vec<Transfer>> {
        let tables = self.shared.tables.read().await;
        let rows = tables
            .transfers
            .values()
            .filter(|transfer| {
                transfer.from_account_id == params.from_account_id
                    || transfer.to_account_id == params.to_account_id
            })
            .cloned();
        Ok(page(rows, params.limit, params.offset))
    }

    async fn begin(&self) -> Result<LedgerTxBox> {
        Ok(Box::new(InMemoryTx {
            shared: Arc::clone(&self.shared),
            held_locks: HashMap::new(),
            staged_accounts: HashMap::new(),
            staged_entries: Vec::new(),
            staged_transfers: Vec::new(),
        }))
    }
}

/// Transaction handle for [`InMemoryLedgerStore`].
///
/// Dropping it releases every row lock it holds and discards staged writes.
pub struct InMemoryTx {
    shared: Arc<Shared>,
    held_locks: HashMap<i64, OwnedMutexGuard<()>>,
    staged_accounts: HashMap<i64, Account>,
    staged_entries: Vec<Entry>,
    staged_transfers: Vec<Transfer>,
}

impl InMemoryTx {
    async fn lock_row(&mut self, id: i64) -> Result<()> {
        if self.held_locks.contains_key(&id) {
            return Ok(());
        }

        let row_lock = self
            .shared
            .row_locks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::account_not_found(id))?;

        let guard = tokio::time::timeout(self.shared.options.lock_timeout, row_lock.lock_owned())
            .await
            .map_err(|_| {
                LedgerError::LockTimeout(format!(
                    "account {} still locked after {:?}",
                    id, self.shared.options.lock_timeout
                ))
            })?;
        self.held_locks.insert(id, guard);
        Ok(())
    }

    async fn ensure_account_exists(&self, id: i64) -> Result<()> {
        if self.staged_accounts.contains_key(&id)
            || self.shared.tables.read().await.accounts.contains_key(&id)
        {
            Ok(())
        } else {
            Err(LedgerError::account_not_found(id))
        }
    }
}

#[async_trait]
impl LedgerTx for InMemoryTx {
    async fn get_account(&mut self, id: i64) -> Result<Account> {
        if let Some(account) = self.staged_accounts.get(&id) {
            return Ok(account.clone());
        }
        let tables = self.shared.tables.read().await;
        tables
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    async fn add_account_balance(&mut self, id: i64, delta: i64) -> Result<Account> {
        // With the row lock held nobody else can change this balance, so the
        // read below and the staged write form a single step.
        self.lock_row(id).await?;

        let mut account = self.get_account(id).await?;
        account.apply_delta(delta)?;
        self.staged_accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry> {
        self.ensure_account_exists(params.account_id).await?;

        let entry = Entry {
            id: self.shared.next_entry_id.fetch_add(1, Ordering::SeqCst),
            account_id: params.account_id,
            amount: params.amount,
            created_at: Utc::now(),
        };
        self.staged_entries.push(entry.clone());
        Ok(entry)
    }

    async fn create_transfer(&mut self, params: CreateTransferParams) -> Result<Transfer> {
        self.ensure_account_exists(params.from_account_id).await?;
        self.ensure_account_exists(params.to_account_id).await?;

        let transfer = Transfer {
            id: self.shared.next_transfer_id.fetch_add(1, Ordering::SeqCst),
            from_account_id: params.from_account_id,
            to_account_id: params.to_account_id,
            amount: params.amount,
            created_at: Utc::now(),
        };
        self.staged_transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTx {
            shared,
            held_locks,
            staged_accounts,
            staged_entries,
            staged_transfers,
        } = *self;

        {
            let mut tables = shared.tables.write().await;
            tables.accounts.extend(staged_accounts);
            tables
                .entries
                .extend(staged_entries.into_iter().map(|entry| (entry.id, entry)));
            tables.transfers.extend(
                staged_transfers
                    .into_iter()
                    .map(|transfer| (transfer.id, transfer)),
            );
        }

        // Row locks go only after the new balances are visible.
        drop(held_locks);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Dropping `self` discards the staged rows and releases `held_locks`.
        Ok(())
    }
}
