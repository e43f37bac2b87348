//! Application layer: transaction scoping and the transfer coordinator.
//!
//! `TransferEngine::transfer_tx` is the only operation that mutates balances.
//! It runs every transfer through `within_transaction`, which commits on
//! success and rolls back on any error, panic or cancellation.

pub mod engine;
pub mod transaction;
