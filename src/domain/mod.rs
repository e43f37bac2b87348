//! Ledger entities and the storage ports the transfer engine is written against.

pub mod account;
pub mod entry;
pub mod ports;
pub mod transfer;
