use crate::domain::ports::{LedgerStore, LedgerTxBox};
use crate::error::Result;
use futures::future::BoxFuture;

/// Runs `work` inside a fresh transaction.
///
/// Commits when `work` returns `Ok`. On `Err` the transaction is rolled back
/// and the error from `work` is returned unchanged. If `work` panics or the
/// returned future is dropped, the handle is dropped with it, which rolls back
/// as well.
pub async fn within_transaction<T, F>(store: &dyn LedgerStore, work: F) -> Result<T>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut LedgerTxBox) -> BoxFuture<'t, Result<T>> + Send,
{
    let mut tx = store.begin().await?;
    tracing::debug!("transaction started");

    match work(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            tracing::debug!("transaction committed");
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(error = %err, "rolling back transaction");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
