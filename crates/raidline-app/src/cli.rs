//! CLI argument definitions for the Raidline terminal.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use raidline_core::RaidlineConfig;

/// Raidline: manage a project's risks, assumptions, issues and dependencies by chatting.
#[derive(Parser, Debug)]
#[command(name = "raidline", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Project key the session works on.
    #[arg(short = 'p', long = "project")]
    pub project: Option<String>,

    /// Base URL of the item-management API.
    #[arg(short = 'u', long = "base-url")]
    pub base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Keep items in memory instead of calling the API.
    #[arg(long = "offline")]
    pub offline: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RAIDLINE_CONFIG env var > ~/.raidline/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("RAIDLINE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the project key.
    ///
    /// Priority: --project flag > `chat.default_project`. `None` if neither is set.
    pub fn resolve_project(&self, config: &RaidlineConfig) -> Option<String> {
        self.project
            .clone()
            .or_else(|| config.chat.default_project.clone())
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
    }

    /// Resolve the API base URL.
    pub fn resolve_base_url(&self, config: &RaidlineConfig) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| config.api.base_url.clone())
    }

    /// Resolve the log level used when RUST_LOG is unset.
    pub fn resolve_log_level(&self, config: &RaidlineConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }

    /// Apply flag overrides to a loaded configuration.
    pub fn apply(&self, config: &mut RaidlineConfig) {
        config.api.base_url = self.resolve_base_url(config);
        config.general.log_level = self.resolve_log_level(config);
        if let Some(project) = self.resolve_project(config) {
            config.chat.default_project = Some(project);
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".raidline").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".raidline").join("config.toml");
    }
    PathBuf::from("config.toml")
}
