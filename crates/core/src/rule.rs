use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of a trigger rule (and of the transaction it produces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    /// Buy when the price drops to or below the target.
    Buy,
    /// Sell when the price rises to or above the target.
    Sell,
}

impl TradeDirection {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

/// Lifecycle state of a trigger rule.
///
/// `Active` is the only non-terminal state. A rule leaves it exactly once:
/// to `Executed` on a successful trade, or to `Failed` on an unexpected
/// execution fault. There is no transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    /// Waiting for its trigger condition.
    Active,
    /// Trade applied; terminal.
    Executed,
    /// Execution fault; terminal.
    Failed,
}

impl RuleStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Executed => "executed",
            Self::Failed => "failed",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "executed" => Some(Self::Executed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true for `Executed` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// A validated rule-creation request, ready to persist.
///
/// Produced only by [`crate::validation::NewRuleRequest::validate`], so the
/// invariants (uppercase symbol, positive price and quantity) hold by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRule {
    pub symbol: String,
    pub direction: TradeDirection,
    pub target_price: Decimal,
    pub quantity: i64,
}
