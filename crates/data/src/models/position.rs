use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A paper portfolio position, keyed by symbol.
///
/// `avg_price` is the weighted-average cost basis: recomputed on every buy,
/// unchanged by sells. A position never exists with quantity 0; it is deleted
/// when a sell drains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub symbol: String,
    pub quantity: i64,
    pub avg_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl PortfolioPosition {
    /// Quantity and cost basis after buying `quantity` more units at `price`.
    ///
    /// `new_avg = (old_qty * old_avg + qty * price) / (old_qty + qty)`
    #[must_use]
    pub fn after_buy(&self, quantity: i64, price: Decimal) -> (i64, Decimal) {
        let new_quantity = self.quantity + quantity;
        let new_avg = (Decimal::from(self.quantity) * self.avg_price
            + Decimal::from(quantity) * price)
            / Decimal::from(new_quantity);
        (new_quantity, new_avg)
    }

    /// Quantity remaining after selling `quantity` units. Basis is unchanged
    /// by a sell.
    #[must_use]
    pub fn after_sell(&self, quantity: i64) -> i64 {
        self.quantity - quantity
    }

    /// Realized profit for selling `quantity` units at `price` against the
    /// current basis.
    #[must_use]
    pub fn realized_pnl(&self, quantity: i64, price: Decimal) -> Decimal {
        (price - self.avg_price) * Decimal::from(quantity)
    }

    /// Current market value at `price`.
    #[must_use]
    pub fn market_value(&self, price: Decimal) -> Decimal {
        Decimal::from(self.quantity) * price
    }

    /// Unrealized profit at `price`.
    #[must_use]
    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        (price - self.avg_price) * Decimal::from(self.quantity)
    }
}
