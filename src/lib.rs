//! A double-entry ledger with a deadlock-free money-transfer engine.
//!
//! - **domain**: accounts, entries, transfers and the storage ports
//! - **application**: transaction scoping and [`TransferEngine`]
//! - **infrastructure**: in-memory and RocksDB (`storage-rocksdb`) stores
//! - **interfaces**: CSV input and output for the command-line front end

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod logging;

pub use application::engine::TransferEngine;
pub use error::{LedgerError, Result};
