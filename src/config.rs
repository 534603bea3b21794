//! Configuration management for Breeze
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::BreezeError;
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Values that mark an API key as "not filled in yet"
const PLACEHOLDER_KEYS: [&str; 4] = [
    "your_api_key_here",
    "your-api-key",
    "changeme",
    "placeholder",
];

/// Root configuration structure for Breeze
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BreezeConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub pollen: PollenConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub climate: ClimateConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Hourly pollen from the same air-quality service, used as pollen fallback
    #[serde(default = "default_air_quality_url")]
    pub pollen_fallback_url: String,
    #[serde(default = "default_climate_archive_url")]
    pub climate_archive_url: String,
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Primary pollen provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollenConfig {
    /// Server-held key for the primary pollen provider
    pub api_key: Option<String>,
    /// Same-origin relay that injects the key, for clients without one
    pub relay_url: Option<String>,
    #[serde(default = "default_google_pollen_url")]
    pub upstream_url: String,
}

/// Location search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_result_count")]
    pub result_count: u8,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Climate comparison configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateConfig {
    #[serde(default = "default_reference_years")]
    pub reference_years: Vec<i32>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

/// Preference store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint; span export is off when unset
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_air_quality_url() -> String {
    "https://air-quality-api.open-meteo.com/v1/air-quality".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_climate_archive_url() -> String {
    "https://archive-api.open-meteo.com/v1/archive".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_google_pollen_url() -> String {
    "https://pollen.googleapis.com/v1/forecast:lookup".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_min_query_len() -> usize {
    2
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_result_count() -> u8 {
    5
}

fn default_language() -> String {
    "en".to_string()
}

fn default_reference_years() -> Vec<i32> {
    vec![1980, 1990, 2000, 2010, 2020]
}

fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://breeze.earth".to_string(),
        "https://www.breeze.earth".to_string(),
    ]
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

fn default_preferences_location() -> String {
    "~/.local/share/breeze".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            air_quality_url: default_air_quality_url(),
            geocoding_url: default_geocoding_url(),
            pollen_fallback_url: default_air_quality_url(),
            climate_archive_url: default_climate_archive_url(),
            forecast_url: default_forecast_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for PollenConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            relay_url: None,
            upstream_url: default_google_pollen_url(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
            debounce_ms: default_debounce_ms(),
            result_count: default_result_count(),
            language: default_language(),
        }
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            reference_years: default_reference_years(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            static_dir: default_static_dir(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            location: default_preferences_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl PollenConfig {
    /// The configured key, unless it is missing, blank or a placeholder
    #[must_use]
    pub fn usable_api_key(&self) -> Option<&str> {
        let key = self.api_key.as_deref()?.trim();
        if key.is_empty() || key.starts_with("YOUR_") {
            return None;
        }
        if PLACEHOLDER_KEYS
            .iter()
            .any(|placeholder| key.eq_ignore_ascii_case(placeholder))
        {
            return None;
        }
        Some(key)
    }
}

impl BreezeConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // BREEZE__POLLEN__API_KEY -> pollen.api_key
        builder = builder.add_source(
            Environment::with_prefix("BREEZE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: BreezeConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("breeze").join("config.toml"))
    }

    /// Expand a leading `~/` against the home directory
    #[must_use]
    pub fn expand_path(path: &str) -> PathBuf {
        match path.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(path)),
            None => PathBuf::from(path),
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.providers.air_quality_url.is_empty() {
            self.providers.air_quality_url = default_air_quality_url();
        }
        if self.providers.geocoding_url.is_empty() {
            self.providers.geocoding_url = default_geocoding_url();
        }
        if self.providers.pollen_fallback_url.is_empty() {
            self.providers.pollen_fallback_url = default_air_quality_url();
        }
        if self.providers.climate_archive_url.is_empty() {
            self.providers.climate_archive_url = default_climate_archive_url();
        }
        if self.providers.forecast_url.is_empty() {
            self.providers.forecast_url = default_forecast_url();
        }
        if self.providers.timeout_seconds == 0 {
            self.providers.timeout_seconds = default_timeout();
        }
        if self.pollen.upstream_url.is_empty() {
            self.pollen.upstream_url = default_google_pollen_url();
        }
        if self.search.result_count == 0 {
            self.search.result_count = default_result_count();
        }
        if self.search.language.is_empty() {
            self.search.language = default_language();
        }
        if self.climate.reference_years.is_empty() {
            self.climate.reference_years = default_reference_years();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.preferences.location.is_empty() {
            self.preferences.location = default_preferences_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_reference_years()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.providers.timeout_seconds > 300 {
            return Err(
                BreezeError::config("Provider timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.search.debounce_ms > 5000 {
            return Err(BreezeError::config("Search debounce cannot exceed 5000 ms").into());
        }

        if self.search.min_query_len == 0 {
            return Err(
                BreezeError::config("Minimum search query length must be at least 1").into(),
            );
        }

        if self.search.result_count > 100 {
            return Err(BreezeError::config("Search result count cannot exceed 100").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(BreezeError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(BreezeError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("air_quality_url", &self.providers.air_quality_url),
            ("geocoding_url", &self.providers.geocoding_url),
            ("pollen_fallback_url", &self.providers.pollen_fallback_url),
            ("climate_archive_url", &self.providers.climate_archive_url),
            ("forecast_url", &self.providers.forecast_url),
            ("pollen.upstream_url", &self.pollen.upstream_url),
        ];
        for (name, url) in urls {
            if !is_http_url(url) {
                return Err(BreezeError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if let Some(relay) = &self.pollen.relay_url {
            if !is_http_url(relay) {
                return Err(
                    BreezeError::config("pollen.relay_url must be a valid HTTP or HTTPS URL")
                        .into(),
                );
            }
        }

        Ok(())
    }

    fn validate_reference_years(&self) -> Result<()> {
        let current_year = Utc::now().year();
        if let Some(year) = self
            .climate
            .reference_years
            .iter()
            .find(|year| !(1940..=current_year).contains(*year))
        {
            return Err(BreezeError::config(format!(
                "Climate reference year {year} is outside 1940..={current_year}"
            ))
            .into());
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BreezeConfig::default();
        assert_eq!(
            config.providers.air_quality_url,
            "https://air-quality-api.open-meteo.com/v1/air-quality"
        );
        assert_eq!(config.providers.timeout_seconds, 30);
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.result_count, 5);
        assert_eq!(config.climate.reference_years.len(), 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.pollen.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_placeholder_keys_are_unusable() {
        let mut pollen = PollenConfig::default();
        assert_eq!(pollen.usable_api_key(), None);

        pollen.api_key = Some("   ".to_string());
        assert_eq!(pollen.usable_api_key(), None);

        pollen.api_key = Some("YOUR_GOOGLE_POLLEN_API_KEY".to_string());
        assert_eq!(pollen.usable_api_key(), None);

        pollen.api_key = Some("your_api_key_here".to_string());
        assert_eq!(pollen.usable_api_key(), None);

        pollen.api_key = Some("AIzaSyExampleRealLookingKey".to_string());
        assert_eq!(pollen.usable_api_key(), Some("AIzaSyExampleRealLookingKey"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = BreezeConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = BreezeConfig::default();
        config.providers.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = BreezeConfig::default();
        config.providers.geocoding_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_old_reference_year() {
        let mut config = BreezeConfig::default();
        config.climate.reference_years = vec![1900, 2000];
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("1900"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = BreezeConfig::default();
        config.providers.forecast_url.clear();
        config.climate.reference_years.clear();
        config.apply_defaults();
        assert_eq!(config.providers.forecast_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.climate.reference_years, default_reference_years());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\ndebounce_ms = 150\n\n[climate]\nreference_years = [1990, 2005]\n"
        )
        .unwrap();

        let config = BreezeConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(config.climate.reference_years, vec![1990, 2005]);
    }

    #[test]
    fn test_config_path_generation() {
        let path = BreezeConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("breeze"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        assert_eq!(
            BreezeConfig::expand_path("/tmp/breeze"),
            PathBuf::from("/tmp/breeze")
        );
    }
}
