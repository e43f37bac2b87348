use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single signed posting against one account.
///
/// Negative amounts are debits, positive amounts are credits. Entries are
/// write-once.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CreateEntryParams {
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ListEntriesParams {
    pub account_id: i64,
    pub limit: usize,
    pub offset: usize,
}
