use papertrader_core::quote::Quote;
use papertrader_core::rule::TradeDirection;
use papertrader_data::TradingRule;

/// Decides whether a rule's trigger condition holds against a quote.
///
/// Buy rules trigger at or below the target (favorable entry); sell rules at
/// or above it (favorable exit). A rule whose direction fails to parse never
/// triggers.
///
/// No side effects; the caller only passes active rules and a quote for the
/// same symbol.
#[must_use]
pub fn should_trigger(rule: &TradingRule, quote: &Quote) -> bool {
    match rule.parsed_direction() {
        Some(TradeDirection::Buy) => quote.price <= rule.target_price,
        Some(TradeDirection::Sell) => quote.price >= rule.target_price,
        None => false,
    }
}
