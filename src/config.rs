use serde::Deserialize;
use std::fs;

use crate::constants::push;
use crate::urgency::UrgencyConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    /// REST base URL; the push endpoint is derived from it (https→wss).
    pub base_url: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub base_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: push::DEFAULT_BASE_INTERVAL_MS,
            max_attempts: push::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub venue_id: String,
    pub api: ApiConfig,

    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub urgency: UrgencyConfig,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_preferences_path")]
    pub preferences_path: String,
    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_preferences_path() -> String {
    "./data/preferences.json".to_string()
}

fn default_token_env_var() -> String {
    "ORDERCAST_TOKEN".to_string()
}

impl AppConfig {
    pub fn load() -> Self {
        let config_path = "config.yaml";
        let content = fs::read_to_string(config_path).expect("Failed to read config.yaml");

        // Strip BOM if present
        let content = content.strip_prefix("\u{feff}").unwrap_or(&content);

        let config: AppConfig = serde_yaml::from_str(content).expect("Failed to parse config.yaml");
        config
    }
}
