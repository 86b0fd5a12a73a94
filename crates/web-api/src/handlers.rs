use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use papertrader_core::quote::Quote;
use papertrader_core::validation::NewRuleRequest;
use papertrader_data::{PortfolioPosition, TradingRule, TransactionRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CreateRuleResponse {
    pub rule_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: message.into(),
        })
    }
}

#[derive(Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<i64>,
}

/// Creates a new trigger rule.
///
/// # Errors
/// Returns 400 with a message if the request fails validation, or 500 if the
/// rule cannot be persisted.
pub async fn create_rule(
    State(state): State<AppState>,
    Json(request): Json<NewRuleRequest>,
) -> Result<(StatusCode, Json<CreateRuleResponse>), (StatusCode, Json<ErrorResponse>)> {
    let rule = request
        .validate()
        .map_err(|err| (StatusCode::BAD_REQUEST, ErrorResponse::new(err.to_string())))?;

    let rule_id = state.repos.rules.insert(&rule).await.map_err(|err| {
        tracing::error!("failed to persist rule: {err:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("failed to persist rule"),
        )
    })?;

    Ok((StatusCode::CREATED, Json(CreateRuleResponse { rule_id })))
}

/// Lists all active trigger rules.
///
/// # Errors
/// Returns 500 if the rule set cannot be read.
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<Vec<TradingRule>>, StatusCode> {
    let rules = state
        .repos
        .rules
        .list_active()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(rules))
}

/// Gets all portfolio positions.
///
/// # Errors
/// Returns 500 if the portfolio cannot be read.
pub async fn get_portfolio(
    State(state): State<AppState>,
) -> Result<Json<Vec<PortfolioPosition>>, StatusCode> {
    let positions = state
        .repos
        .portfolio
        .list_all()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(positions))
}

/// Gets recent ledger entries, newest first.
///
/// # Errors
/// Returns 500 if the ledger cannot be read.
pub async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<TransactionRecord>>, StatusCode> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let records = state
        .repos
        .transactions
        .list_recent(limit)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(records))
}

/// Gets a live quote for a symbol.
///
/// # Errors
/// Returns 404 if the symbol is unknown or the quote is unavailable, or 502
/// if the quote source cannot be reached.
pub async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, (StatusCode, Json<ErrorResponse>)> {
    let quote = state.quotes.fetch_quote(&symbol).await.map_err(|err| {
        tracing::warn!(%symbol, "quote fetch failed: {err:#}");
        (
            StatusCode::BAD_GATEWAY,
            ErrorResponse::new("quote source unavailable"),
        )
    })?;

    quote.map(Json).ok_or((
        StatusCode::NOT_FOUND,
        ErrorResponse::new("symbol not found or quote unavailable"),
    ))
}
