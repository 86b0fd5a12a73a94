//! Data models for the paper trading engine.
//!
//! All models use `rust_decimal::Decimal` for financial precision. Direction
//! and status fields are stored as their string representation and parsed
//! back through the enums in `papertrader-core`.

pub mod position;
pub mod rule;
pub mod transaction;

pub use position::PortfolioPosition;
pub use rule::TradingRule;
pub use transaction::{NewTransaction, TransactionRecord};
