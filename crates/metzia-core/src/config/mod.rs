mod channels;
mod defaults;


pub use channels::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MetziaError;
use defaults::*;

/// Top-level Metzia configuration.
///
/// Loaded once at startup and passed by reference into the product
/// source, affiliate resolver, and dispatcher; never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Product search configuration.
///
/// `app_key` decides the mode for the whole process lifetime: absent or
/// empty means the offline mock source, present means the live API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Ship-to country for offers (ISO 3166 alpha-2).
    #[serde(default = "default_country")]
    pub country: String,
    /// Currency code for displayed prices.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Result language code understood by the API.
    #[serde(default = "default_language")]
    pub language: String,
    /// Open Platform gateway base URL.
    #[serde(default)]
    pub api_base: Option<String>,
    /// App key for the product API.
    #[serde(default)]
    pub app_key: Option<String>,
    /// Affiliate tracking id, sent with link-generation requests.
    #[serde(default)]
    pub tracking_id: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            currency: default_currency(),
            language: default_language(),
            api_base: None,
            app_key: None,
            tracking_id: None,
        }
    }
}

impl SearchConfig {
    /// Whether the offline mock source should serve this process.
    pub fn use_mock(&self) -> bool {
        self.app_key.as_deref().map_or(true, |k| k.is_empty())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, MetziaError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| MetziaError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| MetziaError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
