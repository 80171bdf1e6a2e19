//! Configuration loading

use anyhow::Result;
use hddp_core::ProviderId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub sensors: SensorsConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider scheme attached to every registry mutation
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Provider id attached to every registry mutation
    #[serde(default = "default_provider_id")]
    pub id: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            id: default_provider_id(),
        }
    }
}

fn default_scheme() -> String {
    "hddp".to_string()
}

fn default_provider_id() -> String {
    "org.hddp.hosts".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorsConfig {
    /// Sensor names, first entry for type 3
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            labels: default_labels(),
        }
    }
}

fn default_labels() -> Vec<String> {
    ["Temperature", "Humidity", "Light", "Presence"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// JSON-lines file of decoded replies; stdin when unset or "-"
    #[serde(default)]
    pub path: Option<String>,
}

impl Config {
    pub fn provider_id(&self) -> ProviderId {
        ProviderId::new(&self.provider.scheme, &self.provider.id)
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        replay: ReplayConfig {
            path: Some("packets.jsonl".to_string()),
        },
        ..Config::default()
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    Ok(())
}
