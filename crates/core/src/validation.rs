//! Validation for inbound rule-creation requests.
//!
//! Requests are rejected here, at the boundary, before anything is persisted.

use crate::rule::{NewRule, TradeDirection};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Why a rule-creation request was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol is required")]
    MissingSymbol,

    #[error("direction must be \"buy\" or \"sell\", got {0:?}")]
    InvalidDirection(String),

    #[error("target price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
}

/// A raw rule-creation request as received from the API or CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRuleRequest {
    pub symbol: String,
    pub direction: String,
    pub target_price: Decimal,
    pub quantity: i64,
}

impl NewRuleRequest {
    /// Validates and normalizes the request into a [`NewRule`].
    ///
    /// The symbol is trimmed and uppercased; direction is parsed; price and
    /// quantity must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(self) -> Result<NewRule, ValidationError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ValidationError::MissingSymbol);
        }

        let direction = TradeDirection::parse(&self.direction)
            .ok_or_else(|| ValidationError::InvalidDirection(self.direction.clone()))?;

        if self.target_price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(self.target_price));
        }

        if self.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity(self.quantity));
        }

        Ok(NewRule {
            symbol,
            direction,
            target_price: self.target_price,
            quantity: self.quantity,
        })
    }
}
