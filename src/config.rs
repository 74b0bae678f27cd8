//! Runner settings
//!
//! Read from `--config FILE` or `<config dir>/robot-runner/config.yaml`.
//! A missing file is not an error: defaults apply and a warning is logged.

use std::path::{Path, PathBuf};

use action_primitives::{webdriver::WebDriverConfig, WaitPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::errors::RunnerError;

/// Overrides `webdriver.url`
pub const WEBDRIVER_URL_ENV: &str = "ROBOT_WEBDRIVER_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WebDriver server used by `run`
    pub webdriver: WebDriverConfig,

    /// Wait policy for the built-in scenario
    pub wait: WaitPolicy,
}

impl Config {
    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.webdriver.url.trim().is_empty() {
            return Err(RunnerError::InvalidConfig(
                "webdriver.url cannot be empty".to_string(),
            ));
        }
        self.wait
            .validate()
            .map_err(|err| RunnerError::InvalidConfig(err.to_string()))
    }

    /// Apply an override for the WebDriver URL, ignoring blank values
    pub fn with_webdriver_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            info!(url = %url, "Using WebDriver URL override");
            self.webdriver.url = url;
        }
        self
    }
}

/// Default settings location
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("robot-runner");
    path.push("config.yaml");
    Ok(path)
}

/// Load settings, then apply the environment override
pub async fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    let config = read_config(&config_path).await?;
    Ok(config.with_webdriver_url(std::env::var(WEBDRIVER_URL_ENV).ok()))
}

async fn read_config(config_path: &Path) -> Result<Config> {
    if !fs::try_exists(config_path).await.unwrap_or(false) {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let content = fs::read_to_string(config_path)
        .await
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    let config = Config::from_yaml(&content)
        .with_context(|| format!("Invalid config file {}", config_path.display()))?;

    info!("Loaded configuration from: {}", config_path.display());
    Ok(config)
}
