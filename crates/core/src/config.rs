use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub finnhub: FinnhubConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnhubConfig {
    pub api_url: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

/// Settings for the rule evaluation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between evaluation cycles.
    pub tick_interval_secs: u64,
    /// Upper bound on a single quote fetch, so one stalled symbol
    /// cannot hold up the rest of the tick.
    pub quote_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://papertrader.db".to_string(),
                max_connections: 5,
            },
            finnhub: FinnhubConfig {
                api_url: "https://finnhub.io/api/v1".to_string(),
                api_token: String::new(),
                timeout_secs: 10,
            },
            engine: EngineConfig {
                tick_interval_secs: 5,
                quote_timeout_secs: 10,
            },
        }
    }
}
