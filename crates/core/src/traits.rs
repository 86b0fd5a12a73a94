use crate::quote::Quote;
use anyhow::Result;
use async_trait::async_trait;

/// Source of live market quotes.
///
/// `Ok(None)` means the quote is unavailable for this cycle (unknown symbol,
/// or the venue returned a zero price). `Err` is a transport fault. The
/// engine treats both the same way: skip the rule and retry next tick.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>>;
}
