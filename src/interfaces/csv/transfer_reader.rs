use crate::domain::transfer::TransferTxParams;
use crate::error::{LedgerError, Result};
use std::io::Read;

/// Reads transfer requests from a CSV source.
///
/// Expects a `from_account_id, to_account_id, amount` header. Amounts are
/// passed through as written; rejecting non-positive ones is left to the
/// caller.
pub struct TransferReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransferReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: super::reader_builder(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes transfers.
    pub fn transfers(self) -> impl Iterator<Item = Result<TransferTxParams>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
