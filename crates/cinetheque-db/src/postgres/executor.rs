//! Connection source shared by the PostgreSQL repositories
//!
//! A repository either runs each query on a fresh pool connection, or on the
//! connection of an open transaction shared with the other repositories of
//! the same `PgCatalogTransaction`.

use cinetheque_core::AppError;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

pub(crate) type SharedTransaction = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

#[derive(Clone)]
pub(crate) enum PgExecutor {
    Pool(PgPool),
    Transaction(SharedTransaction),
}

impl PgExecutor {
    /// Check out a connection. For a transaction this locks it until the guard drops.
    pub(crate) async fn acquire(&self) -> Result<ConnectionGuard<'_>, AppError> {
        match self {
            PgExecutor::Pool(pool) => Ok(ConnectionGuard::Pooled(pool.acquire().await?)),
            PgExecutor::Transaction(tx) => Ok(ConnectionGuard::Transaction(tx.lock().await)),
        }
    }
}

pub(crate) enum ConnectionGuard<'a> {
    Pooled(PoolConnection<Postgres>),
    Transaction(MutexGuard<'a, Option<Transaction<'static, Postgres>>>),
}

impl ConnectionGuard<'_> {
    pub(crate) fn conn(&mut self) -> Result<&mut PgConnection, AppError> {
        match self {
            ConnectionGuard::Pooled(conn) => Ok(&mut **conn),
            ConnectionGuard::Transaction(guard) => guard
                .as_mut()
                .map(|tx| &mut **tx)
                .ok_or_else(|| AppError::Internal("Transaction already finished".to_string())),
        }
    }
}

/// Take the transaction out of its shared slot; later queries on it fail.
pub(crate) async fn take_transaction(
    tx: &SharedTransaction,
) -> Result<Transaction<'static, Postgres>, AppError> {
    tx.lock()
        .await
        .take()
        .ok_or_else(|| AppError::Internal("Transaction already finished".to_string()))
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
