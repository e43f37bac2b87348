use super::transaction::within_transaction;
use crate::domain::account::Account;
use crate::domain::entry::CreateEntryParams;
use crate::domain::ports::{LedgerStore, LedgerStoreBox, LedgerTxBox};
use crate::domain::transfer::{CreateTransferParams, TransferTxParams, TransferTxResult};
use crate::error::Result;
use tracing::instrument;

/// The money-transfer coordinator.
///
/// `TransferEngine` owns the ledger store and moves funds between accounts,
/// each move running as one all-or-nothing transaction. It is `Send + Sync`
/// and meant to be shared (e.g. behind an `Arc`) by concurrent callers.
pub struct TransferEngine {
    store: LedgerStoreBox,
}

impl TransferEngine {
    /// Creates a new `TransferEngine` on top of the given store.
    pub fn new(store: LedgerStoreBox) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    /// Moves `amount` from one account to another.
    ///
    /// Within a single transaction this records the transfer, posts a debit
    /// entry for the source and a credit entry for the destination, then
    /// updates both balances. Any failure rolls everything back and is
    /// returned as-is; nothing is retried here.
    ///
    /// Neither the amount, the currencies, nor `from != to` are checked: that
    /// is the caller's business.
    #[instrument(skip(self), fields(from = params.from_account_id, to = params.to_account_id))]
    pub async fn transfer_tx(&self, params: TransferTxParams) -> Result<TransferTxResult> {
        within_transaction(self.store(), move |tx| {
            Box::pin(async move {
                let transfer = tx
                    .create_transfer(CreateTransferParams {
                        from_account_id: params.from_account_id,
                        to_account_id: params.to_account_id,
                        amount: params.amount,
                    })
                    .await?;

                let from_entry = tx
                    .create_entry(CreateEntryParams {
                        account_id: params.from_account_id,
                        amount: -params.amount,
                    })
                    .await?;

                let to_entry = tx
                    .create_entry(CreateEntryParams {
                        account_id: params.to_account_id,
                        amount: params.amount,
                    })
                    .await?;

                // Row locks are always taken lowest id first, whichever side
                // is being debited, so opposite-direction transfers between
                // the same pair cannot wait on each other in a cycle.
                let (from_account, to_account) =
                    if params.from_account_id < params.to_account_id {
                        add_money(
                            tx,
                            params.from_account_id,
                            -params.amount,
                            params.to_account_id,
                            params.amount,
                        )
                        .await?
                    } else {
                        let (to_account, from_account) = add_money(
                            tx,
                            params.to_account_id,
                            params.amount,
                            params.from_account_id,
                            -params.amount,
                        )
                        .await?;
                        (from_account, to_account)
                    };

                Ok(TransferTxResult {
                    transfer,
                    from_account,
                    to_account,
                    from_entry,
                    to_entry,
                })
            })
        })
        .await
    }
}

/// Applies two balance deltas in the order given and returns both snapshots
/// in that same order.
async fn add_money(
    tx: &mut LedgerTxBox,
    first_id: i64,
    first_delta: i64,
    second_id: i64,
    second_delta: i64,
) -> Result<(Account, Account)> {
    let first = tx.add_account_balance(first_id, first_delta).await?;
    let second = tx.add_account_balance(second_id, second_delta).await?;
    Ok((first, second))
}
