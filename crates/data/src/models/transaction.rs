use chrono::{DateTime, Utc};
use papertrader_core::rule::TradeDirection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry in the append-only transaction ledger.
///
/// Ledger entries are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub symbol: String,
    /// Action: "buy" or "sell".
    pub action: String,
    pub quantity: i64,
    /// Execution price per unit.
    pub price: Decimal,
    /// `quantity * price`.
    pub total_value: Decimal,
    /// Profit against the position's cost basis. Sells only; NULL for buys.
    pub realized_pnl: Option<Decimal>,
    pub executed_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Returns the parsed action.
    #[must_use]
    pub fn parsed_action(&self) -> Option<TradeDirection> {
        TradeDirection::parse(&self.action)
    }
}

/// A ledger entry about to be appended.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub symbol: String,
    pub action: TradeDirection,
    pub quantity: i64,
    pub price: Decimal,
    pub realized_pnl: Option<Decimal>,
}

impl NewTransaction {
    /// Total traded value, `quantity * price`.
    #[must_use]
    pub fn total_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }
}
