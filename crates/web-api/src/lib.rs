//! REST API for the paper trading engine.
//!
//! A thin client of the repositories and the quote source; all trading
//! decisions live in `papertrader-engine`.

pub mod handlers;
pub mod server;

pub use server::{ApiServer, AppState};
