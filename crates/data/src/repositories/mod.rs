//! Database repositories for the paper trading engine.
//!
//! Each repository provides typed access to one table. Prices travel as TEXT
//! at the `SQLite` boundary and are parsed back into `Decimal` here.

pub mod portfolio_repo;
pub mod rule_repo;
pub mod transaction_repo;

pub use portfolio_repo::PortfolioRepository;
pub use rule_repo::RuleRepository;
pub use transaction_repo::TransactionRepository;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;

/// All repositories over a single database pool.
#[derive(Clone)]
pub struct Repositories {
    pub rules: RuleRepository,
    pub portfolio: PortfolioRepository,
    pub transactions: TransactionRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            rules: RuleRepository::new(pool.clone()),
            portfolio: PortfolioRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool),
        }
    }
}

pub(crate) fn decimal_from_text(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("invalid decimal in database: {raw:?}"))
}
