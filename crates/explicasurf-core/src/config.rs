use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Default backend serving `/api/explain`.
pub const DEFAULT_API_URL: &str = "https://explicasurf-backend.onrender.com";

/// Environment variable that points the app at another backend for one run.
pub const API_URL_ENV: &str = "EXPLICASURF_API_URL";

/// Longest accepted cache TTL (one year).
pub const MAX_TTL_MINUTES: u64 = 525_600;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Surfing proficiency used to phrase explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Iniciante,
    Intermediario,
    Avancado,
}

impl SkillLevel {
    /// Wire name used in the `level` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iniciante => "iniciante",
            Self::Intermediario => "intermediario",
            Self::Avancado => "avancado",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Iniciante => "Iniciante",
            Self::Intermediario => "Intermediário",
            Self::Avancado => "Avançado",
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iniciante" | "beginner" => Ok(Self::Iniciante),
            "intermediario" | "intermediário" | "intermediate" => Ok(Self::Intermediario),
            "avancado" | "avançado" | "advanced" => Ok(Self::Avancado),
            other => Err(format!("unknown skill level: {other}")),
        }
    }
}

/// Language of derived labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Forecast backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// How derived values are shown
    #[serde(default)]
    pub display: DisplayConfig,

    /// Request cache policy
    #[serde(default)]
    pub cache: CacheConfig,

    /// Chart adapter settings
    #[serde(default)]
    pub charts: ChartsConfig,

    /// Initial selection
    #[serde(default)]
    pub defaults: SelectionDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the forecast API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for transient failures (timeouts, 5xx, 429)
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            // the backend sleeps when idle; cold starts take a while
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub locale: Locale,

    /// Offset of the display clock from UTC, in minutes (Brazil: -180)
    pub utc_offset_minutes: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::PtBr,
            utc_offset_minutes: -180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached responses; least recently used is evicted first
    pub max_entries: Option<usize>,

    /// Minutes before a cached response is refetched
    pub ttl_minutes: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: Some(64),
            ttl_minutes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Number of leading samples shown in the wind chart
    pub wind_window: usize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self { wind_window: 72 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SelectionDefaults {
    pub level: SkillLevel,
    pub day: u8,
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist.
    ///
    /// `EXPLICASURF_API_URL` replaces the backend URL for this run only; it is
    /// never written back to the file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_api_url_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Point the backend at `url` when one is given and non-empty.
    pub fn apply_api_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            tracing::info!("Using backend from {}: {}", API_URL_ENV, url);
            self.backend.base_url = url;
        }
    }

    /// Load configuration from an explicit path, creating it with defaults if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            ConfigError::ParseError(format!("{}: {}", config_path.display(), e))
        })?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.backend.base_url, "backend.base_url", &mut result);

        if self.backend.timeout_secs == 0 {
            result.add_error("backend.timeout_secs", "Timeout must be greater than 0");
        } else if self.backend.timeout_secs > 300 {
            result.add_warning(
                "backend.timeout_secs",
                "Timeout is unusually long (>5 minutes)",
            );
        }

        if self.backend.max_retries > 10 {
            result.add_warning("backend.max_retries", "More than 10 retries per request");
        }

        // Real-world offsets lie within -12:00..=+14:00
        if !(-720..=840).contains(&self.display.utc_offset_minutes) {
            result.add_error(
                "display.utc_offset_minutes",
                format!(
                    "Offset out of range: {} minutes",
                    self.display.utc_offset_minutes
                ),
            );
        }

        match self.cache.max_entries {
            Some(0) => result.add_error(
                "cache.max_entries",
                "Cache capacity must be greater than 0",
            ),
            None => result.add_warning(
                "cache.max_entries",
                "Cache is unbounded for the lifetime of the session",
            ),
            Some(_) => {}
        }

        match self.cache.ttl_minutes {
            Some(0) => result.add_warning("cache.ttl_minutes", "TTL of 0 minutes disables caching"),
            Some(ttl) if ttl > MAX_TTL_MINUTES => result.add_error(
                "cache.ttl_minutes",
                format!("TTL must be at most {} minutes, got {}", MAX_TTL_MINUTES, ttl),
            ),
            _ => {}
        }

        if self.charts.wind_window == 0 {
            result.add_error("charts.wind_window", "Wind window must hold at least one sample");
        }

        if self.defaults.day > 2 {
            result.add_error(
                "defaults.day",
                format!("Day offset must be 0, 1 or 2, got {}", self.defaults.day),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.scheme() == "http" {
                    result.add_warning(field_name, "Backend is reached over plain http");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("explicasurf");

        Ok(config_dir.join("config.toml"))
    }
}
