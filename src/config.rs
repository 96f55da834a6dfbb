//! Configuration management for the weather proxy
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and provides validation for all configuration settings. The
//! resulting [`ProxyConfig`] is built once at startup and handed to the
//! request handlers.

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::location_resolver::AddressOrder;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Inbound HTTP server settings
    pub server: ServerConfig,
    /// Weather dataset API settings
    pub weather: WeatherConfig,
    /// Reverse geocoding API settings
    pub geocoding: GeocodingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Inbound HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Origins allowed by CORS; empty or `*` allows any origin
    pub allowed_origins: Vec<String>,
    /// Whole-request timeout in seconds
    pub request_timeout_seconds: u32,
}

/// Weather dataset API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// CWA open data API key
    pub api_key: Option<String>,
    /// Base URL of the datastore
    pub base_url: String,
    /// Dataset identifier appended to the base URL
    pub dataset_id: String,
    /// Outbound request timeout in seconds
    pub timeout_seconds: u32,
}

/// Reverse geocoding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Base URL of the Nominatim-compatible service
    pub base_url: String,
    /// Preference order used to pick the administrative-area name
    pub address_order: AddressOrder,
    /// User agent sent upstream (Nominatim rejects anonymous clients)
    pub user_agent: String,
    /// Outbound request timeout in seconds
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://opendata.cwa.gov.tw/api/v1/rest/datastore".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    crate::USER_AGENT.to_string()
}

fn default_upstream_timeout() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: Vec::new(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            dataset_id: "F-C0032-001".to_string(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            address_order: AddressOrder::default(),
            user_agent: default_user_agent(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address string to bind to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether CORS should accept any origin
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl WeatherConfig {
    /// API key, treating an empty string the same as an absent one
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Full URL of the forecast dataset endpoint
    #[must_use]
    pub fn dataset_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.dataset_id)
    }
}

impl GeocodingConfig {
    /// Full URL of the reverse geocoding endpoint
    #[must_use]
    pub fn reverse_url(&self) -> String {
        format!("{}/reverse", self.base_url.trim_end_matches('/'))
    }
}

impl ProxyConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("WEATHER_PROXY_CONFIG").map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHER_PROXY__WEATHER__API_KEY=... style overrides
        builder = builder.add_source(
            Environment::with_prefix("WEATHER_PROXY")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true),
        );

        // Conventional deployment variables win over everything else
        builder = builder
            .set_override_option("weather.api_key", std::env::var("CWA_API_KEY").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option(
                "server.allowed_origins",
                std::env::var("ALLOWED_ORIGINS")
                    .ok()
                    .map(|origins| parse_origins(&origins)),
            )?;

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: ProxyConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, seconds) in [
            ("server.request_timeout_seconds", self.server.request_timeout_seconds),
            ("weather.timeout_seconds", self.weather.timeout_seconds),
            ("geocoding.timeout_seconds", self.geocoding.timeout_seconds),
        ] {
            if seconds == 0 || seconds > 300 {
                bail!("{name} must be between 1 and 300 seconds, got {seconds}");
            }
        }

        let slowest_upstream = self.weather.timeout_seconds.max(self.geocoding.timeout_seconds);
        if self.server.request_timeout_seconds <= slowest_upstream {
            bail!(
                "server.request_timeout_seconds ({}) must exceed the upstream timeouts ({slowest_upstream})",
                self.server.request_timeout_seconds
            );
        }

        if self.server.port == 0 {
            bail!("server.port cannot be 0");
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            );
        }

        for (name, url) in [
            ("weather.base_url", &self.weather.base_url),
            ("geocoding.base_url", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("{name} must be a valid HTTP or HTTPS URL");
            }
        }

        Ok(())
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
