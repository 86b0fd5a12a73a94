use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use papertrader_core::config::AppConfig;
use papertrader_core::rule::NewRule;
use papertrader_core::traits::QuoteSource;
use papertrader_core::validation::NewRuleRequest;
use papertrader_core::ConfigLoader;
use papertrader_data::{Database, Repositories};
use papertrader_engine::TradeScheduler;
use papertrader_finnhub::FinnhubClient;
use papertrader_web_api::ApiServer;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "papertrader")]
#[command(about = "Paper trading automation engine", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trading loop together with the web API
    Run,
    /// Start the web API server only (no trading loop)
    Server,
    /// Run exactly one evaluation cycle and exit
    Tick,
    /// Fetch and print a live quote
    Quote {
        /// Ticker symbol (e.g. "AAPL")
        symbol: String,
    },
    /// Create a trigger rule
    AddRule {
        /// Ticker symbol (e.g. "AAPL")
        #[arg(long)]
        symbol: String,
        /// "buy" or "sell"
        #[arg(long)]
        direction: String,
        /// Trigger price
        #[arg(long)]
        target_price: Decimal,
        /// Number of units to trade
        #[arg(long)]
        quantity: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::load_from(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    match cli.command {
        Commands::Run => run(config).await,
        Commands::Server => server(config).await,
        Commands::Tick => tick(config).await,
        Commands::Quote { symbol } => quote(config, &symbol).await,
        Commands::AddRule {
            symbol,
            direction,
            target_price,
            quantity,
        } => add_rule(config, symbol, direction, target_price, quantity).await,
    }
}

async fn open_repositories(config: &AppConfig) -> Result<Repositories> {
    let database = Database::new(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    Ok(Repositories::new(database.pool()))
}

fn quote_source(config: &AppConfig) -> Result<Arc<dyn QuoteSource>> {
    Ok(Arc::new(FinnhubClient::new(&config.finnhub)?))
}

/// The original process shape: trading loop and HTTP API side by side,
/// stopped together on ctrl-c.
async fn run(config: AppConfig) -> Result<()> {
    let repos = open_repositories(&config).await?;
    let quotes = quote_source(&config)?;

    let scheduler = TradeScheduler::new(repos.clone(), quotes.clone(), &config.engine);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    let server = ApiServer::new(repos, quotes);
    let addr = config.server.bind_addr();

    tokio::select! {
        result = server.serve(&addr) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    shutdown_tx.send(true).ok();
    scheduler_handle
        .await
        .context("Scheduler task panicked")?;

    Ok(())
}

async fn server(config: AppConfig) -> Result<()> {
    let repos = open_repositories(&config).await?;
    let quotes = quote_source(&config)?;

    let server = ApiServer::new(repos, quotes);
    server.serve(&config.server.bind_addr()).await
}

async fn tick(config: AppConfig) -> Result<()> {
    let repos = open_repositories(&config).await?;
    let quotes = quote_source(&config)?;

    let scheduler = TradeScheduler::new(repos, quotes, &config.engine);
    scheduler.run_cycle().await
}

async fn quote(config: AppConfig, symbol: &str) -> Result<()> {
    let quotes = quote_source(&config)?;

    match quotes.fetch_quote(symbol).await? {
        Some(quote) => println!("{}", serde_json::to_string_pretty(&quote)?),
        None => println!("No quote available for {}", symbol.to_uppercase()),
    }

    Ok(())
}

async fn add_rule(
    config: AppConfig,
    symbol: String,
    direction: String,
    target_price: Decimal,
    quantity: i64,
) -> Result<()> {
    let rule: NewRule = NewRuleRequest {
        symbol,
        direction,
        target_price,
        quantity,
    }
    .validate()?;

    let repos = open_repositories(&config).await?;
    let rule_id = repos.rules.insert(&rule).await?;

    println!(
        "Created rule {}: {} {} x{} at {}",
        rule_id,
        rule.direction.as_str(),
        rule.symbol,
        rule.quantity,
        rule.target_price
    );

    Ok(())
}
