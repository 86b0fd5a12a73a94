//! The periodic evaluation loop.
//!
//! One driver, one tick at a time: the cycle is awaited inside the tick arm,
//! so a slow cycle delays the next tick instead of overlapping it. Every tick
//! re-reads the active rules from storage; nothing is cached across ticks.

use crate::evaluator;
use crate::executor::{ExecutionOutcome, TradeExecutor};
use anyhow::{Context, Result};
use papertrader_core::config::EngineConfig;
use papertrader_core::traits::QuoteSource;
use papertrader_data::{Repositories, TradingRule};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Drives fetch → evaluate → execute across all active rules on a fixed
/// interval.
pub struct TradeScheduler {
    repos: Repositories,
    quotes: Arc<dyn QuoteSource>,
    executor: TradeExecutor,
    tick_interval: Duration,
    quote_timeout: Duration,
}

impl TradeScheduler {
    /// Creates a new scheduler over the given repositories and quote source.
    #[must_use]
    pub fn new(repos: Repositories, quotes: Arc<dyn QuoteSource>, config: &EngineConfig) -> Self {
        let executor = TradeExecutor::new(repos.clone());
        Self {
            repos,
            quotes,
            executor,
            tick_interval: Duration::from_secs(config.tick_interval_secs),
            quote_timeout: Duration::from_secs(config.quote_timeout_secs),
        }
    }

    /// Runs the evaluation loop until the shutdown channel flips to true (or
    /// its sender is dropped). Cycle failures are logged, not propagated.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.tick_interval.as_secs(),
            "trade scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.run_cycle().await {
                        error!("evaluation cycle failed: {err:#}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("trade scheduler stopped");
    }

    /// Runs one evaluation cycle over all active rules.
    ///
    /// Per-rule failures are logged and do not stop the cycle; only a failure
    /// to read the rule set itself aborts.
    ///
    /// # Errors
    /// Returns an error if the active rule set cannot be read.
    pub async fn run_cycle(&self) -> Result<()> {
        let rules = self.repos.rules.list_active().await?;
        debug!(count = rules.len(), "evaluating active rules");

        for rule in rules {
            if let Err(err) = self.process_rule(&rule).await {
                error!(
                    rule_id = rule.id,
                    symbol = %rule.symbol,
                    "rule processing failed: {err:#}"
                );
            }
        }

        Ok(())
    }

    async fn process_rule(&self, rule: &TradingRule) -> Result<()> {
        rule.parsed_direction().with_context(|| {
            format!("rule {} has unparseable direction {:?}", rule.id, rule.direction)
        })?;

        let quote = match timeout(self.quote_timeout, self.quotes.fetch_quote(&rule.symbol)).await {
            Err(_) => {
                warn!(symbol = %rule.symbol, "quote fetch timed out, skipping for this cycle");
                return Ok(());
            }
            Ok(Err(err)) => {
                warn!(symbol = %rule.symbol, "quote fetch failed, skipping for this cycle: {err:#}");
                return Ok(());
            }
            Ok(Ok(None)) => {
                warn!(symbol = %rule.symbol, "quote unavailable, skipping for this cycle");
                return Ok(());
            }
            Ok(Ok(Some(quote))) => quote,
        };

        if !evaluator::should_trigger(rule, &quote) {
            return Ok(());
        }

        info!(
            rule_id = rule.id,
            symbol = %rule.symbol,
            direction = %rule.direction,
            price = %quote.price,
            target = %rule.target_price,
            "trigger condition met"
        );

        match self.executor.execute(rule, quote.price).await? {
            ExecutionOutcome::Executed {
                action,
                quantity,
                price,
                realized_pnl,
            } => {
                info!(
                    rule_id = rule.id,
                    symbol = %rule.symbol,
                    action = action.as_str(),
                    quantity,
                    price = %price,
                    realized_pnl = ?realized_pnl,
                    "trade executed"
                );
            }
            ExecutionOutcome::InsufficientHoldings { held, requested } => {
                warn!(
                    rule_id = rule.id,
                    symbol = %rule.symbol,
                    held,
                    requested,
                    "sell blocked by insufficient holdings, rule stays active"
                );
            }
            ExecutionOutcome::AlreadyHandled => {
                debug!(rule_id = rule.id, "rule was already handled elsewhere");
            }
        }

        Ok(())
    }
}
