use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RaidError, Result};
use crate::types::{ItemStatus, Priority};

/// Top-level configuration for Raidline.
///
/// Loaded from `~/.raidline/config.toml` by default. Missing sections fall
/// back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaidlineConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub defaults: ItemDefaultsConfig,
}

impl RaidlineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RaidlineConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values outside their meaningful range.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.chat.dialogue_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RaidError::Config(format!(
                "chat.dialogue_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.chat.max_message_length == 0 {
            return Err(RaidError::Config(
                "chat.max_message_length must be greater than zero".to_string(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(RaidError::Config(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Item-management API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the item-management API.
    pub base_url: String,
    /// Optional bearer token sent with every request.
    pub api_token: Option<String>,
    /// Transport-level request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            timeout_secs: 30,
        }
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub enabled: bool,
    /// Minimum classifier confidence required to start a command.
    pub dialogue_threshold: f32,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
    /// Project used when the caller does not name one.
    pub default_project: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dialogue_threshold: 0.5,
            max_message_length: 2000,
            default_project: None,
        }
    }
}

/// Values applied to optional item fields left unset at creation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDefaultsConfig {
    pub status: ItemStatus,
    pub priority: Priority,
}
