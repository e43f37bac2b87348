use super::account::Account;
use super::entry::Entry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable record of funds moving between two accounts.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Magnitude of the movement; always positive for well-formed requests.
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CreateTransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Matches transfers leaving `from_account_id` or arriving at `to_account_id`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ListTransfersParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub limit: usize,
    pub offset: usize,
}

/// Input of a money transfer.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct TransferTxParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Everything a committed transfer produced.
///
/// Both account fields are snapshots taken right after their balance update,
/// inside the same transaction.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}
