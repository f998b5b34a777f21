//! Database transaction utilities
//!
//! Multi-statement writes (a payment row plus the earnings increment) go
//! through `TransactionGuard` so they commit or roll back together.

use sqlx::{PgPool, Postgres, Transaction};
use std::ops::{Deref, DerefMut};

/// A transaction that must be finished with `commit` or `rollback`.
///
/// Dropping an unfinished guard drops the inner sqlx transaction, which
/// rolls it back when its connection returns to the pool.
///
/// ```ignore
/// let mut tx = TransactionGuard::begin(pool).await?;
/// sqlx::query("UPDATE content_items SET ...").execute(&mut **tx).await?;
/// tx.commit().await?;
/// ```
pub struct TransactionGuard<'a> {
    transaction: Option<Transaction<'a, Postgres>>,
}

impl<'a> TransactionGuard<'a> {
    pub async fn begin(pool: &'a PgPool) -> Result<Self, sqlx::Error> {
        let transaction = pool.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to begin database transaction");
            e
        })?;

        Ok(Self {
            transaction: Some(transaction),
        })
    }

    pub async fn commit(mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.transaction.take() {
            tx.commit().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to commit database transaction");
                e
            })?;
        }
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to roll back database transaction");
                e
            })?;
        }
        Ok(())
    }
}

impl<'a> Deref for TransactionGuard<'a> {
    type Target = Transaction<'a, Postgres>;

    fn deref(&self) -> &Self::Target {
        // Only `commit`/`rollback` take the transaction, and both consume the guard.
        self.transaction
            .as_ref()
            .expect("transaction is present until the guard is consumed")
    }
}

impl<'a> DerefMut for TransactionGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.transaction
            .as_mut()
            .expect("transaction is present until the guard is consumed")
    }
}

impl<'a> Drop for TransactionGuard<'a> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            tracing::warn!("Transaction dropped without commit or rollback; rolling back");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn begin_on_closed_pool_is_a_sqlx_error() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://paylink@localhost/unused")
            .unwrap();
        pool.close().await;

        let result = TransactionGuard::begin(&pool).await;
        assert!(matches!(result, Err(sqlx::Error::PoolClosed)));
    }
}
