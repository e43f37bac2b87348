use super::account::{Account, CreateAccountParams, ListAccountsParams};
use super::entry::{CreateEntryParams, Entry, ListEntriesParams};
use super::transfer::{CreateTransferParams, ListTransfersParams, Transfer};
use crate::error::Result;
use async_trait::async_trait;

/// Durable storage of accounts, entries and transfers.
///
/// Methods on this trait run outside of any caller-visible transaction: each
/// is a single read or a single-row insert. Anything that must commit together
/// goes through a [`LedgerTx`] obtained from [`LedgerStore::begin`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create_account(&self, params: CreateAccountParams) -> Result<Account>;
    async fn get_account(&self, id: i64) -> Result<Account>;
    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>>;
    /// Every account, ordered by id.
    async fn all_accounts(&self) -> Result<Vec<Account>>;

    async fn get_entry(&self, id: i64) -> Result<Entry>;
    async fn list_entries(&self, params: ListEntriesParams) -> Result<Vec<Entry>>;

    async fn get_transfer(&self, id: i64) -> Result<Transfer>;
    async fn list_transfers(&self, params: ListTransfersParams) -> Result<Vec<Transfer>>;

    /// Opens a transaction. Nothing written through the returned handle is
    /// visible to other readers until [`LedgerTx::commit`] succeeds.
    async fn begin(&self) -> Result<LedgerTxBox>;
}

/// A transaction-scoped view of the store.
///
/// Row locks taken by [`LedgerTx::add_account_balance`] are held until the
/// transaction ends. Dropping the handle without committing rolls back every
/// write and releases every lock, so cancellation and panics leave no trace.
#[async_trait]
pub trait LedgerTx: Send {
    /// Plain read of the account as this transaction sees it. Takes no lock.
    async fn get_account(&mut self, id: i64) -> Result<Account>;

    /// Locks the account row (waiting for other holders) and adds `delta` to
    /// its balance in one step, returning the updated account.
    async fn add_account_balance(&mut self, id: i64, delta: i64) -> Result<Account>;

    async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry>;
    async fn create_transfer(&mut self, params: CreateTransferParams) -> Result<Transfer>;

    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type LedgerTxBox = Box<dyn LedgerTx>;
