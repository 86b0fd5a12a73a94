//! Data storage and management for the paper trading engine.
//!
//! This crate provides:
//! - `SQLite` database handle with embedded migrations
//! - Data models for rules, positions, and ledger entries
//! - Repositories for typed database access
//!
//! All money values use `rust_decimal::Decimal` for financial precision.

pub mod database;
pub mod models;
pub mod repositories;

pub use database::Database;

// Re-export models
pub use models::{NewTransaction, PortfolioPosition, TradingRule, TransactionRecord};

// Re-export repositories
pub use repositories::{
    PortfolioRepository, Repositories, RuleRepository, TransactionRepository,
};
