use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Lock wait timed out: {0}")]
    LockTimeout(String),
    #[error("Serialization failure: {0}")]
    SerializationFailure(String),
    #[error("Transaction is closed")]
    TransactionClosed,
    #[error("Internal error: {0}")]
    InternalError(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LedgerError {
    pub fn account_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "account",
            id,
        }
    }

    pub fn entry_not_found(id: i64) -> Self {
        Self::NotFound { entity: "entry", id }
    }

    pub fn transfer_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "transfer",
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        match err.kind() {
            rocksdb::ErrorKind::TimedOut => Self::LockTimeout(err.into_string()),
            rocksdb::ErrorKind::Busy | rocksdb::ErrorKind::TryAgain => {
                Self::SerializationFailure(err.into_string())
            }
            _ => Self::InternalError(Box::new(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
