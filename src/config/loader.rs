//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching
//! config/default.toml. Environment variables take precedence over the file
//! for the API key and base URL, and for the single-run knobs
//! (`RANK_COUNT`, `RANK_TAB`, `COOLDOWN_MS`).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::pump_studio::{PumpStudioConfig, DEFAULT_BASE_URL};
use crate::application::{cooldown_for_quota, SessionConfig};
use crate::domain::MarketTab;
use crate::strategy::{ThresholdError, TradeThresholds};

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub trader: TradeThresholds,
    #[serde(default)]
    pub paper: PaperSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Pump Studio API section
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token; prefer PUMP_STUDIO_API_KEY in .env over the file
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts for idempotent GET requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl ApiSection {
    /// API key, or an error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Client settings for `PumpStudioClient::with_config`
    pub fn client_config(&self) -> Result<PumpStudioConfig, ConfigError> {
        Ok(PumpStudioConfig {
            base_url: self.base_url.clone(),
            api_key: self.require_api_key()?.to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
        })
    }
}

/// Ranking session section
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// Partitions to rotate through, in order
    #[serde(default = "default_tabs")]
    pub tabs: Vec<MarketTab>,
    /// Tokens requested per partition pass
    #[serde(default = "default_items_per_tab")]
    pub items_per_tab: usize,
    /// Accepted submissions per minute allowed upstream
    #[serde(default = "default_quota_per_minute")]
    pub quota_per_minute: u32,
    /// Pause after each submission (must not undercut the quota)
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Wall-clock budget of a session
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u64,
    /// Minimum time before a token is processed again
    #[serde(default = "default_freshness_ttl_minutes")]
    pub freshness_ttl_minutes: u64,
    /// Pause between rotations through the tabs
    #[serde(default = "default_rotation_pause_secs")]
    pub rotation_pause_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            tabs: default_tabs(),
            items_per_tab: default_items_per_tab(),
            quota_per_minute: default_quota_per_minute(),
            cooldown_ms: default_cooldown_ms(),
            duration_minutes: default_duration_minutes(),
            freshness_ttl_minutes: default_freshness_ttl_minutes(),
            rotation_pause_secs: default_rotation_pause_secs(),
        }
    }
}

/// Paper trading section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperSection {
    /// Forward accepted trade signals to the paper desk
    #[serde(default)]
    pub enabled: bool,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_max_retries() -> u32 { 3 }
fn default_tabs() -> Vec<MarketTab> { vec![MarketTab::All] }
fn default_items_per_tab() -> usize { 5 }
fn default_quota_per_minute() -> u32 { 1 }
fn default_cooldown_ms() -> u64 { 65_000 }
fn default_duration_minutes() -> u64 { 60 }
fn default_freshness_ttl_minutes() -> u64 { 30 }
fn default_rotation_pause_secs() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid [trader] thresholds: {0}")]
    Thresholds(#[from] ThresholdError),
    #[error("PUMP_STUDIO_API_KEY is required (set it in .env or [api] api_key)")]
    MissingApiKey,
}

/// Load configuration from a TOML file, apply environment overrides and
/// validate. A leading `~` in the path is expanded.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let raw = path.as_ref().to_string_lossy();
    let path = PathBuf::from(shellexpand::tilde(&raw).as_ref());

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::IoError {
        path: path.clone(),
        source,
    })?;
    let mut config: Config = toml::from_str(&content)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Overlay values from `lookup` (the process environment in
    /// `load_config`). Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("PUMP_STUDIO_API_KEY") {
            self.api.api_key = Some(key.trim().to_string());
        }
        if let Some(base) = get("PUMP_API_BASE") {
            self.api.base_url = base.trim().to_string();
        }
        if let Some(count) = get("RANK_COUNT") {
            self.session.items_per_tab = count.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "RANK_COUNT must be a positive integer, got '{}'",
                    count
                ))
            })?;
        }
        if let Some(tab) = get("RANK_TAB") {
            let tab: MarketTab = tab.parse().map_err(ConfigError::ValidationError)?;
            self.session.tabs = vec![tab];
        }
        if let Some(ms) = get("COOLDOWN_MS") {
            self.session.cooldown_ms = ms.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "COOLDOWN_MS must be a whole number of milliseconds, got '{}'",
                    ms
                ))
            })?;
        }
        Ok(())
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate API section
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url cannot be empty".to_string(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        // Validate session section
        if self.session.tabs.is_empty() {
            return Err(ConfigError::ValidationError(
                "tabs cannot be empty".to_string(),
            ));
        }

        if self.session.items_per_tab == 0 {
            return Err(ConfigError::ValidationError(format!(
                "items_per_tab must be > 0, got {}",
                self.session.items_per_tab
            )));
        }

        if self.session.quota_per_minute == 0 {
            return Err(ConfigError::ValidationError(format!(
                "quota_per_minute must be > 0, got {}",
                self.session.quota_per_minute
            )));
        }

        let floor = cooldown_for_quota(self.session.quota_per_minute);
        if self.session.cooldown() < floor {
            return Err(ConfigError::ValidationError(format!(
                "cooldown_ms {} is shorter than the quota of {}/min allows (minimum {})",
                self.session.cooldown_ms,
                self.session.quota_per_minute,
                floor.as_millis()
            )));
        }

        if self.session.duration_minutes == 0 {
            return Err(ConfigError::ValidationError(format!(
                "duration_minutes must be > 0, got {}",
                self.session.duration_minutes
            )));
        }

        // Validate logging
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        self.trader.validate()?;

        Ok(())
    }
}

impl SessionSection {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.duration_minutes.saturating_mul(60))
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        let session = &config.session;
        SessionConfig {
            items_per_partition: session.items_per_tab,
            cooldown: session.cooldown(),
            quota_per_minute: session.quota_per_minute,
            session_budget: session.budget(),
            freshness_ttl: Duration::from_secs(session.freshness_ttl_minutes.saturating_mul(60)),
            rotation_pause: Duration::from_secs(session.rotation_pause_secs),
            tabs: session.tabs.clone(),
        }
    }
}
