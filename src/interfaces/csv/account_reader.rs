use crate::domain::account::CreateAccountParams;
use crate::error::{LedgerError, Result};
use std::io::Read;

/// Reads accounts to open from a CSV source with an
/// `owner, currency, balance` header.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: super::reader_builder(source),
        }
    }

    pub fn accounts(self) -> impl Iterator<Item = Result<CreateAccountParams>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Currency;

    #[test]
    fn test_reads_accounts() {
        let data = "owner, currency, balance\nalice, USD, 1000\nbob, EUR, 0";
        let accounts: Vec<CreateAccountParams> = AccountReader::new(data.as_bytes())
            .accounts()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].owner, "alice");
        assert_eq!(accounts[0].currency, Currency::Usd);
        assert_eq!(accounts[0].balance, 1000);
        assert_eq!(accounts[1].currency, Currency::Eur);
    }

    #[test]
    fn test_rejects_unknown_currency() {
        let data = "owner, currency, balance\nalice, XYZ, 1000";
        let mut accounts = AccountReader::new(data.as_bytes()).accounts();
        assert!(accounts.next().unwrap().is_err());
    }
}
