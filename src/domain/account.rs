use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO currency codes an account may be opened in.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Cad,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cad => "CAD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Represents a positive monetary amount in minor currency units.
///
/// The transfer engine applies whatever amount it is handed; callers use this
/// type to reject zero and negative amounts before a transfer is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self, LedgerError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LedgerError::ValidationError(format!(
                "Amount must be positive, got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = LedgerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// A ledger account.
///
/// `id` and `currency` never change after creation; `balance` is only ever
/// mutated through a transaction's atomic increment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub currency: Currency,
    /// Signed balance in minor currency units.
    pub balance: i64,
}

impl Account {
    /// Adds `delta` to the balance, failing instead of wrapping when the
    /// result leaves the `i64` range.
    pub fn apply_delta(&mut self, delta: i64) -> Result<(), LedgerError> {
        self.balance = self.balance.checked_add(delta).ok_or_else(|| {
            LedgerError::ValidationError(format!(
                "balance of account {} out of range after adding {}",
                self.id, delta
            ))
        })?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct CreateAccountParams {
    pub owner: String,
    pub currency: Currency,
    pub balance: i64,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ListAccountsParams {
    pub owner: String,
    pub limit: usize,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_validation() {
        assert_eq!(Amount::new(1).unwrap().value(), 1);
        assert!(matches!(
            Amount::new(0),
            Err(LedgerError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::try_from(-10),
            Err(LedgerError::ValidationError(_))
        ));
    }

    #[test]
    fn test_apply_delta_overflow() {
        let mut account = Account {
            id: 1,
            owner: "alice".to_string(),
            currency: Currency::Usd,
            balance: i64::MAX - 1,
        };
        account.apply_delta(1).unwrap();
        assert_eq!(account.balance, i64::MAX);

        assert!(matches!(
            account.apply_delta(1),
            Err(LedgerError::ValidationError(_))
        ));
        assert_eq!(account.balance, i64::MAX);
    }

    #[test]
    fn test_currency_serialization() {
        let json = serde_json::to_string(&Currency::Usd).unwrap();
        assert_eq!(json, "\"USD\"");

        let parsed: Currency = serde_json::from_str("\"CAD\"").unwrap();
        assert_eq!(parsed, Currency::Cad);
        assert!(serde_json::from_str::<Currency>("\"GBP\"").is_err());
    }

    #[test]
    fn test_account_round_trips_through_json() {
        let account = Account {
            id: 7,
            owner: "alice".to_string(),
            currency: Currency::Eur,
            balance: -25,
        };
        let bytes = serde_json::to_vec(&account).unwrap();
        let decoded: Account = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, account);
    }
}
