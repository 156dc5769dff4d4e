//! Taskdeck configuration, stored as TOML under the platform config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// One problem found by `Config::validate`, tied to a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.field)
    }
}

/// Errors block startup; warnings are logged and ignored.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Self::issue(field, message));
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Self::issue(field, message));
    }

    pub fn error_summary(&self) -> String {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        parts.join("; ")
    }

    fn issue(field: impl Into<String>, message: impl Into<String>) -> ConfigIssue {
        ConfigIssue {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory backing local storage (session token, task list)
    pub data_dir: PathBuf,

    /// Weather lookup settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Simulated network latency for store operations
    #[serde(default)]
    pub latency: LatencyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the OpenWeatherMap API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// API key. When unset, `OPENWEATHER_API_KEY` is read at runtime; the
    /// environment value is never written back to the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// How long a cached snapshot stays fresh
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,

    /// Optional cap on distinct cached locations (unbounded when unset)
    #[serde(default)]
    pub max_cache_entries: Option<usize>,

    /// Transport timeout for a single lookup
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_cache_ttl_minutes() -> u32 {
    30
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            api_key: None,
            cache_ttl_minutes: default_cache_ttl_minutes(),
            max_cache_entries: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl WeatherConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_ttl_minutes) * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Key from the file, else from `OPENWEATHER_API_KEY`. Blank and
    /// placeholder values count as missing.
    pub fn resolved_api_key(&self) -> Option<String> {
        pick_api_key(self.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())
    }

    pub fn is_configured(&self) -> bool {
        self.resolved_api_key().is_some()
    }
}

const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

fn pick_api_key(file: Option<&str>, env: Option<String>) -> Option<String> {
    let usable = |k: &str| !k.trim().is_empty() && !k.starts_with("YOUR_");
    file.filter(|k| usable(k))
        .map(|k| k.trim().to_string())
        .or_else(|| env.filter(|k| usable(k)).map(|k| k.trim().to_string()))
}

/// Artificial delays emulating network round-trips, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyConfig {
    pub auth_ms: u64,
    pub logout_ms: u64,
    pub task_ms: u64,
    pub toggle_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            auth_ms: 1000,
            logout_ms: 500,
            task_ms: 500,
            toggle_ms: 300,
        }
    }
}

impl LatencyConfig {
    /// No artificial delay at all (tests, scripted runs).
    pub fn none() -> Self {
        Self {
            auth_ms: 0,
            logout_ms: 0,
            task_ms: 0,
            toggle_ms: 0,
        }
    }

    pub fn auth(&self) -> Duration {
        Duration::from_millis(self.auth_ms)
    }

    pub fn logout(&self) -> Duration {
        Duration::from_millis(self.logout_ms)
    }

    pub fn task(&self) -> Duration {
        Duration::from_millis(self.task_ms)
    }

    pub fn toggle(&self) -> Duration {
        Duration::from_millis(self.toggle_ms)
    }
}

/// Sleep for `delay`, skipping the timer entirely when it is zero.
pub async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskdeck");

        Self {
            data_dir,
            weather: WeatherConfig::default(),
            latency: LatencyConfig::default(),
        }
    }
}

impl Config {
    /// Read `config.toml`, writing a default one on first run.
    ///
    /// # Errors
    /// Fails if the config directory cannot be located, or the file cannot be
    /// read, parsed or (on first run) written.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            return Self::load_from(&path);
        }

        tracing::info!("No config at {}; writing defaults", path.display());
        let config = Self::default();
        config.save_to(&path)?;
        Ok(config)
    }

    /// Parse a config file at an explicit path.
    ///
    /// # Errors
    /// `ConfigError::NotFound` if the file is missing, `ConfigError::ParseError`
    /// if it is not valid TOML for this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::NotFound(format!("{}: {}", path.display(), e)))?;
        let config = toml::from_str(&raw)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// `load()` followed by `validate()`; warnings are logged.
    ///
    /// # Errors
    /// Everything `load()` can return, plus `ConfigError::Invalid` when
    /// validation reports errors.
    pub fn load_validated() -> Result<Self> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }
        for warning in &validation.warnings {
            tracing::warn!("Config: {}", warning);
        }

        Ok(config)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::check_http_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.weather.cache_ttl_minutes == 0 {
            result.add_error(
                "weather.cache_ttl_minutes",
                "Cache TTL must be greater than 0",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.weather.max_cache_entries == Some(0) {
            result.add_error(
                "weather.max_cache_entries",
                "Cache size cap must be greater than 0 when set",
            );
        }

        if !self.weather.is_configured() {
            result.add_warning(
                "weather.api_key",
                "Weather API key not configured - tasks will be created without weather",
            );
        }

        if self.latency.auth_ms > 60_000 || self.latency.task_ms > 60_000 {
            result.add_warning("latency", "Simulated latency is longer than a minute");
        }

        if self.data_dir.exists() && !self.data_dir.is_dir() {
            result.add_error(
                "data_dir",
                format!("Path is not a directory: {}", self.data_dir.display()),
            );
        }

        result
    }

    fn check_http_url(raw: &str, field: &str, result: &mut ValidationResult) {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                result.add_error(field, format!("Not a valid URL: {}", e));
                return;
            }
        };

        if !matches!(url.scheme(), "http" | "https") {
            result.add_error(field, format!("Expected an http or https URL, got {}", url.scheme()));
        }
        if url.host().is_none() {
            result.add_error(field, "URL has no host");
        }
    }

    /// Write as pretty TOML, creating parent directories.
    ///
    /// # Errors
    /// Fails if serialization or any filesystem step fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("Cannot serialize config")?;
        std::fs::write(path, raw).with_context(|| format!("Cannot write {}", path.display()))
    }

    fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("No platform config directory")?;
        Ok(base.join("taskdeck").join("config.toml"))
    }
}
