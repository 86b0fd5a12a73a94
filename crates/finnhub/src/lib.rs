//! Finnhub REST API client for live stock quotes.
//!
//! Implements the `QuoteSource` trait from `papertrader-core`. A quote with a
//! zero current price is reported as unavailable, matching Finnhub's behavior
//! for unknown symbols.

pub mod client;

pub use client::FinnhubClient;
