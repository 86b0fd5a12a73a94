//! Transaction ledger repository.
//!
//! The ledger is append-only: there are no update or delete operations here
//! on purpose.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{NewTransaction, TransactionRecord};
use crate::repositories::decimal_from_text;

/// Repository for the append-only transaction ledger.
#[derive(Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

type TransactionRow = (
    i64,
    String,
    String,
    i64,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
);

fn transaction_from_row(row: TransactionRow) -> Result<TransactionRecord> {
    let (id, symbol, action, quantity, price, total_value, realized_pnl, executed_at) = row;
    Ok(TransactionRecord {
        id,
        symbol,
        action,
        quantity,
        price: decimal_from_text(&price)?,
        total_value: decimal_from_text(&total_value)?,
        realized_pnl: realized_pnl.as_deref().map(decimal_from_text).transpose()?,
        executed_at,
    })
}

impl TransactionRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends a ledger entry and returns the generated ID.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn append(&self, tx: &NewTransaction) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            INSERT INTO transactions (symbol, action, quantity, price, total_value, realized_pnl, executed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id
            ",
        )
        .bind(&tx.symbol)
        .bind(tx.action.as_str())
        .bind(tx.quantity)
        .bind(tx.price.to_string())
        .bind(tx.total_value().to_string())
        .bind(tx.realized_pnl.map(|pnl| pnl.to_string()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Lists the most recent ledger entries.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<TransactionRecord>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r"
            SELECT id, symbol, action, quantity, price, total_value, realized_pnl, executed_at
            FROM transactions
            ORDER BY executed_at DESC, id DESC
            LIMIT ?1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(transaction_from_row).collect()
    }
}
