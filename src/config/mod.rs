mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads `.env`, then the YAML config (if any), then environment overrides.
pub async fn load() -> Result<Config> {
    // A missing .env is not an error
    let _ = dotenvy::dotenv();

    let mut config = match env::var("CONFIG_PATH") {
        Ok(config_path) => load_file(&config_path).await?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_file(DEFAULT_CONFIG_PATH).await?
        }
        Err(_) => {
            debug!("No configuration file found, using defaults");
            Config::default()
        }
    };

    config.apply_env_overrides(|key| env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

pub async fn load_file(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

impl Config {
    /// `API_KEY` (or the legacy `apiKey`) replaces `llm.api_key`; `PORT`
    /// replaces `server.port`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = ["API_KEY", "apiKey"]
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty());
        if let Some(api_key) = api_key {
            self.llm.api_key = api_key.trim().to_string();
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("Invalid PORT override: {port}")))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::config(
                "API key is required; set API_KEY (or apiKey) or llm.api_key",
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::config("llm.model must not be empty"));
        }
        Ok(())
    }
}
