//! Finnhub REST client.
//!
//! Finnhub's `/quote` endpoint answers every symbol, known or not; unknown
//! symbols come back with all-zero fields rather than an error status. The
//! zero-price guard below is what turns that shape into "unavailable".

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use papertrader_core::config::FinnhubConfig;
use papertrader_core::quote::Quote;
use papertrader_core::traits::QuoteSource;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Finnhub production API base URL.
pub const FINNHUB_API_URL: &str = "https://finnhub.io/api/v1";

/// Raw `/quote` response payload.
///
/// Field names follow Finnhub's wire format: `c` = current price, `d` =
/// change, `dp` = change percent, `h`/`l` = day high/low, `o` = open,
/// `pc` = previous close.
#[derive(Debug, Deserialize)]
struct QuotePayload {
    #[serde(default)]
    c: Decimal,
    #[serde(default)]
    d: Option<Decimal>,
    #[serde(default)]
    dp: Option<Decimal>,
    #[serde(default)]
    h: Decimal,
    #[serde(default)]
    l: Decimal,
    #[serde(default)]
    o: Decimal,
    #[serde(default)]
    pc: Decimal,
}

/// REST client for Finnhub quotes.
pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl FinnhubClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &FinnhubConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build Finnhub HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }
}

fn quote_from_payload(symbol: String, payload: QuotePayload) -> Option<Quote> {
    if payload.c <= Decimal::ZERO {
        return None;
    }

    Some(Quote {
        symbol,
        price: payload.c,
        change: payload.d.unwrap_or(Decimal::ZERO),
        change_percent: payload.dp.unwrap_or(Decimal::ZERO),
        high: payload.h,
        low: payload.l,
        open: payload.o,
        previous_close: payload.pc,
        fetched_at: Utc::now(),
    })
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    async fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let symbol = symbol.trim().to_uppercase();
        let url = format!("{}/quote", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol.as_str()), ("token", self.api_token.as_str())])
            .send()
            .await
            .with_context(|| format!("Quote request failed for {symbol}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Finnhub returned {status} for {symbol}");
        }

        let payload: QuotePayload = response
            .json()
            .await
            .with_context(|| format!("Malformed quote payload for {symbol}"))?;

        let quote = quote_from_payload(symbol.clone(), payload);
        if quote.is_none() {
            tracing::debug!(%symbol, "Finnhub returned a zero quote");
        }

        Ok(quote)
    }
}
