//! Trade execution against the paper portfolio and ledger.
//!
//! Execution claims the rule first: an atomic `active -> executed` status
//! transition in the repository. Only the winner of that transition touches
//! the portfolio, which is what keeps a rule from executing twice when two
//! evaluation cycles observe it as active. A storage fault after a won claim
//! terminalizes the rule as `failed` so it cannot retry-storm.

use anyhow::{Context, Result};
use papertrader_core::rule::{RuleStatus, TradeDirection};
use papertrader_data::{NewTransaction, Repositories, TradingRule};
use rust_decimal::Decimal;
use tracing::error;

/// What happened when a triggered rule was handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The trade was applied and the rule is now `executed`.
    Executed {
        action: TradeDirection,
        quantity: i64,
        price: Decimal,
        /// Profit against cost basis; sells only.
        realized_pnl: Option<Decimal>,
    },
    /// Sell rejected: the portfolio does not hold enough of the symbol.
    /// The rule stays `active`; a later cycle may succeed once holdings
    /// are replenished.
    InsufficientHoldings { held: i64, requested: i64 },
    /// Another cycle already moved the rule out of `active`; nothing was
    /// mutated here.
    AlreadyHandled,
}

/// Applies triggered rules to the portfolio and transaction ledger.
#[derive(Clone)]
pub struct TradeExecutor {
    repos: Repositories,
}

impl TradeExecutor {
    /// Creates a new executor over the given repositories.
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Attempts to apply a triggered rule at the given execution price.
    ///
    /// Sell-insufficiency is checked before the claim so a blocked sell
    /// leaves the rule `active` and untouched.
    ///
    /// # Errors
    ///
    /// Returns an error on a storage fault. If the fault happened after the
    /// rule was claimed, the rule has been moved to `failed`.
    pub async fn execute(&self, rule: &TradingRule, price: Decimal) -> Result<ExecutionOutcome> {
        let direction = rule
            .parsed_direction()
            .with_context(|| format!("rule {} has unparseable direction {:?}", rule.id, rule.direction))?;

        if direction == TradeDirection::Sell {
            let held = self
                .repos
                .portfolio
                .get(&rule.symbol)
                .await?
                .map_or(0, |position| position.quantity);
            if held < rule.quantity {
                return Ok(ExecutionOutcome::InsufficientHoldings {
                    held,
                    requested: rule.quantity,
                });
            }
        }

        // The claim: exactly one caller wins this transition per rule.
        let claimed = self
            .repos
            .rules
            .transition_status(rule.id, RuleStatus::Executed, RuleStatus::Active)
            .await?;
        if !claimed {
            return Ok(ExecutionOutcome::AlreadyHandled);
        }

        match self.apply(rule, direction, price).await {
            Ok(realized_pnl) => Ok(ExecutionOutcome::Executed {
                action: direction,
                quantity: rule.quantity,
                price,
                realized_pnl,
            }),
            Err(err) => {
                if let Err(mark_err) = self.repos.rules.mark_failed(rule.id).await {
                    error!(rule_id = rule.id, "failed to terminalize faulted rule: {mark_err:#}");
                }
                Err(err)
            }
        }
    }

    /// Mutates the portfolio and appends the ledger entry. Runs only after a
    /// won claim.
    async fn apply(
        &self,
        rule: &TradingRule,
        direction: TradeDirection,
        price: Decimal,
    ) -> Result<Option<Decimal>> {
        let realized_pnl = match direction {
            TradeDirection::Buy => {
                let (quantity, avg_price) = match self.repos.portfolio.get(&rule.symbol).await? {
                    Some(position) => position.after_buy(rule.quantity, price),
                    None => (rule.quantity, price),
                };
                self.repos
                    .portfolio
                    .upsert(&rule.symbol, quantity, avg_price)
                    .await?;
                None
            }
            TradeDirection::Sell => {
                let position = self
                    .repos
                    .portfolio
                    .get(&rule.symbol)
                    .await?
                    .with_context(|| format!("position for {} vanished mid-execution", rule.symbol))?;

                let remaining = position.after_sell(rule.quantity);
                if remaining == 0 {
                    self.repos.portfolio.delete(&rule.symbol).await?;
                } else {
                    self.repos
                        .portfolio
                        .upsert(&rule.symbol, remaining, position.avg_price)
                        .await?;
                }
                Some(position.realized_pnl(rule.quantity, price))
            }
        };

        self.repos
            .transactions
            .append(&NewTransaction {
                symbol: rule.symbol.clone(),
                action: direction,
                quantity: rule.quantity,
                price,
                realized_pnl,
            })
            .await?;

        Ok(realized_pnl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papertrader_core::rule::NewRule;
    use papertrader_data::Database;
    use rust_decimal_macros::dec;

    // =========================================================================
    // Test Helpers
    // =========================================================================

    async fn setup() -> (Repositories, TradeExecutor) {
        let db = Database::new_in_memory().await.unwrap();
        let repos = Repositories::new(db.pool());
        let executor = TradeExecutor::new(repos.clone());
        (repos, executor)
    }

    async fn insert_rule(
        repos: &Repositories,
        symbol: &str,
        direction: TradeDirection,
        target: Decimal,
        quantity: i64,
    ) -> TradingRule {
        let id = repos
            .rules
            .insert(&NewRule {
                symbol: symbol.to_string(),
                direction,
                target_price: target,
                quantity,
            })
            .await
            .unwrap();
        repos.rules.get(id).await.unwrap().unwrap()
    }

    // =========================================================================
    // Buy Path
    // =========================================================================

    #[tokio::test]
    async fn test_buy_creates_position_at_execution_price() {
        // Scenario A: buy AAPL target 150, quoted 149.
        let (repos, executor) = setup().await;
        let rule = insert_rule(&repos, "AAPL", TradeDirection::Buy, dec!(150), 10).await;

        let outcome = executor.execute(&rule, dec!(149)).await.unwrap();

        assert_eq!(
            outcome,
            ExecutionOutcome::Executed {
                action: TradeDirection::Buy,
                quantity: 10,
                price: dec!(149),
                realized_pnl: None,
            }
        );

        let position = repos.portfolio.get("AAPL").await.unwrap().unwrap();
        assert_eq!(position.quantity, 10);
        assert_eq!(position.avg_price, dec!(149));

        let rule = repos.rules.get(rule.id).await.unwrap().unwrap();
        assert_eq!(rule.parsed_status(), Some(RuleStatus::Executed));
        assert!(rule.executed_at.is_some());

        let ledger = repos.transactions.list_recent(10).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].action, "buy");
        assert_eq!(ledger[0].total_value, dec!(1490));
        assert_eq!(ledger[0].realized_pnl, None);
    }

    #[tokio::test]
    async fn test_buy_into_existing_position_blends_basis() {
        let (repos, executor) = setup().await;
        repos.portfolio.upsert("AAPL", 10, dec!(100)).await.unwrap();
        let rule = insert_rule(&repos, "AAPL", TradeDirection::Buy, dec!(210), 10).await;

        executor.execute(&rule, dec!(200)).await.unwrap();

        // (10*100 + 10*200) / 20 = 150
        let position = repos.portfolio.get("AAPL").await.unwrap().unwrap();
        assert_eq!(position.quantity, 20);
        assert_eq!(position.avg_price, dec!(150));
    }

    // =========================================================================
    // Sell Path
    // =========================================================================

    #[tokio::test]
    async fn test_sell_insufficient_holdings_is_retryable() {
        // Scenario B: hold 10, sell rule wants 15.
        let (repos, executor) = setup().await;
        repos.portfolio.upsert("AAPL", 10, dec!(149)).await.unwrap();
        let rule = insert_rule(&repos, "AAPL", TradeDirection::Sell, dec!(160), 15).await;

        let outcome = executor.execute(&rule, dec!(161)).await.unwrap();

        assert_eq!(
            outcome,
            ExecutionOutcome::InsufficientHoldings {
                held: 10,
                requested: 15,
            }
        );

        // Rule still active, portfolio untouched, nothing in the ledger.
        let rule = repos.rules.get(rule.id).await.unwrap().unwrap();
        assert!(rule.is_active());
        assert!(rule.executed_at.is_none());

        let position = repos.portfolio.get("AAPL").await.unwrap().unwrap();
        assert_eq!(position.quantity, 10);
        assert_eq!(position.avg_price, dec!(149));

        assert!(repos.transactions.list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sell_without_position_is_retryable() {
        let (repos, executor) = setup().await;
        let rule = insert_rule(&repos, "AAPL", TradeDirection::Sell, dec!(160), 5).await;

        let outcome = executor.execute(&rule, dec!(161)).await.unwrap();

        assert_eq!(
            outcome,
            ExecutionOutcome::InsufficientHoldings {
                held: 0,
                requested: 5,
            }
        );
        assert!(repos.rules.get(rule.id).await.unwrap().unwrap().is_active());
    }

    #[tokio::test]
    async fn test_sell_drains_position_and_records_pnl() {
        // Scenario C: hold (10, 149), sell 10 at 161.
        let (repos, executor) = setup().await;
        repos.portfolio.upsert("AAPL", 10, dec!(149)).await.unwrap();
        let rule = insert_rule(&repos, "AAPL", TradeDirection::Sell, dec!(160), 10).await;

        let outcome = executor.execute(&rule, dec!(161)).await.unwrap();

        assert_eq!(
            outcome,
            ExecutionOutcome::Executed {
                action: TradeDirection::Sell,
                quantity: 10,
                price: dec!(161),
                realized_pnl: Some(dec!(120)),
            }
        );

        // Drained to zero: the row is gone, not zeroed.
        assert!(repos.portfolio.get("AAPL").await.unwrap().is_none());

        let ledger = repos.transactions.list_recent(10).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].total_value, dec!(1610));
        assert_eq!(ledger[0].realized_pnl, Some(dec!(120)));
    }

    #[tokio::test]
    async fn test_partial_sell_keeps_basis() {
        let (repos, executor) = setup().await;
        repos.portfolio.upsert("AAPL", 10, dec!(149)).await.unwrap();
        let rule = insert_rule(&repos, "AAPL", TradeDirection::Sell, dec!(160), 4).await;

        executor.execute(&rule, dec!(161)).await.unwrap();

        let position = repos.portfolio.get("AAPL").await.unwrap().unwrap();
        assert_eq!(position.quantity, 6);
        assert_eq!(position.avg_price, dec!(149));
    }

    // =========================================================================
    // At-Most-One Execution
    // =========================================================================

    #[tokio::test]
    async fn test_concurrent_execution_applies_once() {
        let (repos, executor) = setup().await;
        let rule = insert_rule(&repos, "AAPL", TradeDirection::Buy, dec!(150), 10).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let executor = executor.clone();
            let rule = rule.clone();
            handles.push(tokio::spawn(async move {
                executor.execute(&rule, dec!(149)).await.unwrap()
            }));
        }

        let mut executed = 0;
        let mut already_handled = 0;
        for handle in handles {
            match handle.await.unwrap() {
                ExecutionOutcome::Executed { .. } => executed += 1,
                ExecutionOutcome::AlreadyHandled => already_handled += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }

        assert_eq!(executed, 1);
        assert_eq!(already_handled, 7);

        // The portfolio and ledger saw exactly one application.
        let position = repos.portfolio.get("AAPL").await.unwrap().unwrap();
        assert_eq!(position.quantity, 10);
        assert_eq!(repos.transactions.list_recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_rule_snapshot_is_not_reexecuted() {
        let (repos, executor) = setup().await;
        let rule = insert_rule(&repos, "AAPL", TradeDirection::Buy, dec!(150), 10).await;

        executor.execute(&rule, dec!(149)).await.unwrap();
        // A second cycle still holding the pre-execution snapshot.
        let outcome = executor.execute(&rule, dec!(148)).await.unwrap();

        assert_eq!(outcome, ExecutionOutcome::AlreadyHandled);
        assert_eq!(repos.transactions.list_recent(10).await.unwrap().len(), 1);
    }

    // =========================================================================
    // Fault Path
    // =========================================================================

    #[tokio::test]
    async fn test_unparseable_direction_is_an_error() {
        let (repos, executor) = setup().await;
        let mut rule = insert_rule(&repos, "AAPL", TradeDirection::Buy, dec!(150), 10).await;
        rule.direction = "short".to_string();

        assert!(executor.execute(&rule, dec!(149)).await.is_err());
    }
}
