use crate::domain::account::Account;
use crate::error::Result;
use std::io::Write;

/// Writes the account table as CSV (`id,owner,currency,balance`).
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, accounts: impl IntoIterator<Item = Account>) -> Result<()> {
        // Serializing structs only emits a header once a row exists; write it
        // up front so an empty ledger still produces one.
        self.writer
            .write_record(["id", "owner", "currency", "balance"])?;
        for account in accounts {
            self.writer.write_record([
                account.id.to_string(),
                account.owner,
                account.currency.to_string(),
                account.balance.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
