pub mod config;
pub mod config_loader;
pub mod quote;
pub mod rule;
pub mod traits;
pub mod validation;

pub use config::{AppConfig, DatabaseConfig, EngineConfig, FinnhubConfig, ServerConfig};
pub use config_loader::ConfigLoader;
pub use quote::Quote;
pub use rule::{NewRule, RuleStatus, TradeDirection};
pub use traits::QuoteSource;
pub use validation::{NewRuleRequest, ValidationError};
