use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use papertrader_core::traits::QuoteSource;
use papertrader_data::Repositories;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub quotes: Arc<dyn QuoteSource>,
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub fn new(repos: Repositories, quotes: Arc<dyn QuoteSource>) -> Self {
        Self {
            state: AppState { repos, quotes },
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/rules", post(handlers::create_rule))
            .route("/api/rules", get(handlers::list_rules))
            .route("/api/portfolio", get(handlers::get_portfolio))
            .route("/api/transactions", get(handlers::get_transactions))
            .route("/api/quote/:symbol", get(handlers::get_quote))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve
    /// requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
