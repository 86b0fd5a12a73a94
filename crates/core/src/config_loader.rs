use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging defaults, the TOML config
    /// file, and environment variables (highest precedence).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be parsed or a value
    /// has the wrong shape.
    pub fn load() -> Result<AppConfig> {
        Self::load_from("config/Config.toml")
    }

    /// Loads application configuration from a specific TOML file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be parsed or a value
    /// has the wrong shape.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PAPERTRADER_").split("__"))
            .extract()?;

        Ok(config)
    }
}
