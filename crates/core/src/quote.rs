use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A point-in-time market quote for a single symbol.
///
/// Quotes are ephemeral: they are fetched, evaluated against the active rules
/// for one cycle, and discarded. They are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    /// Current price. Always positive; a zero or missing price from the
    /// venue is reported as "unavailable" instead of a `Quote`.
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub open: Decimal,
    pub previous_close: Decimal,
    pub fetched_at: DateTime<Utc>,
}
