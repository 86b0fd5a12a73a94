//! Portfolio position repository.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::models::PortfolioPosition;
use crate::repositories::decimal_from_text;

/// Repository for paper portfolio positions.
#[derive(Clone)]
pub struct PortfolioRepository {
    pool: SqlitePool,
}

type PositionRow = (String, i64, String, DateTime<Utc>);

fn position_from_row(row: PositionRow) -> Result<PortfolioPosition> {
    let (symbol, quantity, avg_price, updated_at) = row;
    Ok(PortfolioPosition {
        symbol,
        quantity,
        avg_price: decimal_from_text(&avg_price)?,
        updated_at,
    })
}

impl PortfolioRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Gets the position for a symbol, if one exists.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get(&self, symbol: &str) -> Result<Option<PortfolioPosition>> {
        let row: Option<PositionRow> = sqlx::query_as(
            "SELECT symbol, quantity, avg_price, updated_at FROM portfolio WHERE symbol = ?1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        row.map(position_from_row).transpose()
    }

    /// Creates or replaces the position for a symbol.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert(&self, symbol: &str, quantity: i64, avg_price: Decimal) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO portfolio (symbol, quantity, avg_price, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(symbol) DO UPDATE SET
                quantity = excluded.quantity,
                avg_price = excluded.avg_price,
                updated_at = excluded.updated_at
            ",
        )
        .bind(symbol)
        .bind(quantity)
        .bind(avg_price.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the position for a symbol (used when a sell drains it to zero).
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, symbol: &str) -> Result<()> {
        sqlx::query("DELETE FROM portfolio WHERE symbol = ?1")
            .bind(symbol)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Lists all positions, most recently touched first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<PortfolioPosition>> {
        let rows: Vec<PositionRow> = sqlx::query_as(
            "SELECT symbol, quantity, avg_price, updated_at FROM portfolio ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(position_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use rust_decimal_macros::dec;

    async fn repo() -> PortfolioRepository {
        let db = Database::new_in_memory().await.unwrap();
        PortfolioRepository::new(db.pool())
    }

    #[tokio::test]
    async fn test_get_missing_position() {
        let repo = repo().await;
        assert!(repo.get("AAPL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let repo = repo().await;

        repo.upsert("AAPL", 10, dec!(149)).await.unwrap();
        let pos = repo.get("AAPL").await.unwrap().unwrap();
        assert_eq!(pos.quantity, 10);
        assert_eq!(pos.avg_price, dec!(149));

        repo.upsert("AAPL", 20, dec!(150.5)).await.unwrap();
        let pos = repo.get("AAPL").await.unwrap().unwrap();
        assert_eq!(pos.quantity, 20);
        assert_eq!(pos.avg_price, dec!(150.5));

        // Still one row.
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_position() {
        let repo = repo().await;
        repo.upsert("AAPL", 10, dec!(149)).await.unwrap();
        repo.delete("AAPL").await.unwrap();
        assert!(repo.get("AAPL").await.unwrap().is_none());
    }
}
