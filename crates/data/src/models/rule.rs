use chrono::{DateTime, Utc};
use papertrader_core::rule::{RuleStatus, TradeDirection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A persisted price-trigger rule.
///
/// Target price and quantity are fixed at creation; only `status` and
/// `executed_at` change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingRule {
    pub id: i64,
    pub symbol: String,
    /// Direction: "buy" or "sell".
    pub direction: String,
    pub target_price: Decimal,
    pub quantity: i64,
    /// Lifecycle status: "active", "executed", "failed".
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// Set exactly once, on the terminal transition.
    pub executed_at: Option<DateTime<Utc>>,
}

impl TradingRule {
    /// Returns the parsed direction.
    #[must_use]
    pub fn parsed_direction(&self) -> Option<TradeDirection> {
        TradeDirection::parse(&self.direction)
    }

    /// Returns the parsed lifecycle status.
    #[must_use]
    pub fn parsed_status(&self) -> Option<RuleStatus> {
        RuleStatus::parse(&self.status)
    }

    /// Returns true if this rule is waiting for its trigger.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active.as_str()
    }
}
