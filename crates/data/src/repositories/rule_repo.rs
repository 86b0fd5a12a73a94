//! Trading rule repository.
//!
//! `transition_status` is the atomic conditional update that enforces the
//! at-most-one-execution invariant: the UPDATE is guarded by the expected
//! prior status, and `rows_affected` decides which caller won.

use anyhow::Result;
use chrono::{DateTime, Utc};
use papertrader_core::rule::{NewRule, RuleStatus};
use sqlx::SqlitePool;

use crate::models::TradingRule;
use crate::repositories::decimal_from_text;

/// Repository for trigger rule operations.
#[derive(Clone)]
pub struct RuleRepository {
    pool: SqlitePool,
}

type RuleRow = (
    i64,
    String,
    String,
    String,
    i64,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

const RULE_COLUMNS: &str =
    "id, symbol, direction, target_price, quantity, status, created_at, executed_at";

fn rule_from_row(row: RuleRow) -> Result<TradingRule> {
    let (id, symbol, direction, target_price, quantity, status, created_at, executed_at) = row;
    Ok(TradingRule {
        id,
        symbol,
        direction,
        target_price: decimal_from_text(&target_price)?,
        quantity,
        status,
        created_at,
        executed_at,
    })
}

impl RuleRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new active rule and returns the generated ID.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, rule: &NewRule) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            INSERT INTO trading_rules (symbol, direction, target_price, quantity, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id
            ",
        )
        .bind(&rule.symbol)
        .bind(rule.direction.as_str())
        .bind(rule.target_price.to_string())
        .bind(rule.quantity)
        .bind(RuleStatus::Active.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Gets a rule by ID.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: i64) -> Result<Option<TradingRule>> {
        let row: Option<RuleRow> = sqlx::query_as(&format!(
            "SELECT {RULE_COLUMNS} FROM trading_rules WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(rule_from_row).transpose()
    }

    /// Lists all rules currently waiting for their trigger.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_active(&self) -> Result<Vec<TradingRule>> {
        let rows: Vec<RuleRow> = sqlx::query_as(&format!(
            "SELECT {RULE_COLUMNS} FROM trading_rules WHERE status = ?1 ORDER BY created_at ASC"
        ))
        .bind(RuleStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(rule_from_row).collect()
    }

    /// Lists the most recently created rules, any status.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<TradingRule>> {
        let rows: Vec<RuleRow> = sqlx::query_as(&format!(
            "SELECT {RULE_COLUMNS} FROM trading_rules ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(rule_from_row).collect()
    }

    /// Atomically transitions a rule's status, conditioned on the expected
    /// prior status. Returns true if this call won the transition, false if
    /// the rule was no longer in `expected` (someone else got there first).
    ///
    /// `executed_at` is stamped when the target status is terminal.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn transition_status(
        &self,
        id: i64,
        to: RuleStatus,
        expected: RuleStatus,
    ) -> Result<bool> {
        let executed_at = to.is_terminal().then(Utc::now);

        let result = sqlx::query(
            r"
            UPDATE trading_rules
            SET status = ?1, executed_at = ?2
            WHERE id = ?3 AND status = ?4
            ",
        )
        .bind(to.as_str())
        .bind(executed_at)
        .bind(id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Moves a rule to terminal `failed`, unconditionally.
    ///
    /// Used when execution faults after the rule was already claimed; the
    /// rule must not stay claimed-but-unapplied.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn mark_failed(&self, id: i64) -> Result<()> {
        sqlx::query(
            r"
            UPDATE trading_rules
            SET status = ?1, executed_at = ?2
            WHERE id = ?3
            ",
        )
        .bind(RuleStatus::Failed.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
