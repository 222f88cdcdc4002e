//! Configuration management for `TripScout` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripScoutError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripScout` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TripScoutConfig {
    /// Geocoding service configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Weather service configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Points-of-interest service configuration
    #[serde(default)]
    pub poi: PoiConfig,
    /// Request orchestration settings
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Geocoding service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
    /// Delay before each upstream lookup, to respect rate limits
    #[serde(default = "default_geocoding_throttle")]
    pub throttle_ms: u64,
    /// Maximum number of candidates requested per lookup
    #[serde(default = "default_geocoding_max_candidates")]
    pub max_candidates: u32,
}

/// Weather service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Points-of-interest service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiConfig {
    /// Base URL for the Overpass-style POI API
    #[serde(default = "default_poi_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_poi_timeout")]
    pub timeout_seconds: u32,
}

/// Request orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Maximum number of attractions returned per request
    #[serde(default = "default_attraction_limit")]
    pub attraction_limit: u32,
    /// Per-branch result timeout for the concurrent fan-out, in seconds
    #[serde(default = "default_branch_timeout")]
    pub branch_timeout_seconds: u32,
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
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoding_timeout() -> u32 {
    5
}

fn default_geocoding_throttle() -> u64 {
    500
}

fn default_geocoding_max_candidates() -> u32 {
    10
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_poi_base_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_poi_timeout() -> u32 {
    20
}

fn default_attraction_limit() -> u32 {
    5
}

fn default_branch_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_geocoding_timeout(),
            throttle_ms: default_geocoding_throttle(),
            max_candidates: default_geocoding_max_candidates(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            base_url: default_poi_base_url(),
            timeout_seconds: default_poi_timeout(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            attraction_limit: default_attraction_limit(),
            branch_timeout_seconds: default_branch_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TripScoutConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
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

        // Add environment variable overrides with TRIPSCOUT_ prefix
        builder = builder.add_source(
            Environment::with_prefix("TRIPSCOUT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TripScoutConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripscout").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.timeout_seconds == 0 || self.geocoding.timeout_seconds > 300 {
            return Err(TripScoutError::config(
                "Geocoding timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 300 {
            return Err(
                TripScoutError::config("Weather timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.poi.timeout_seconds == 0 || self.poi.timeout_seconds > 300 {
            return Err(
                TripScoutError::config("POI timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.geocoding.max_candidates == 0 || self.geocoding.max_candidates > 50 {
            return Err(TripScoutError::config(
                "Geocoding max candidates must be between 1 and 50",
            )
            .into());
        }

        if self.planner.attraction_limit == 0 || self.planner.attraction_limit > 100 {
            return Err(
                TripScoutError::config("Attraction limit must be between 1 and 100").into(),
            );
        }

        if self.planner.branch_timeout_seconds == 0 || self.planner.branch_timeout_seconds > 300 {
            return Err(TripScoutError::config(
                "Branch timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripScoutError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripScoutError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Weather", &self.weather.base_url),
            ("POI", &self.poi.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripScoutError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TripScoutConfig::default();
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.geocoding.throttle_ms, 500);
        assert_eq!(config.geocoding.max_candidates, 10);
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.poi.timeout_seconds, 20);
        assert_eq!(config.planner.attraction_limit, 5);
        assert_eq!(config.planner.branch_timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = TripScoutConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripScoutConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripScoutConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Weather timeout"));
    }

    #[test]
    fn test_config_validation_zero_attraction_limit() {
        let mut config = TripScoutConfig::default();
        config.planner.attraction_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_base_url() {
        let mut config = TripScoutConfig::default();
        config.poi.base_url = "ftp://overpass.example".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("POI base URL"));
    }

    #[test]
    fn test_config_path_generation() {
        let path = TripScoutConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("tripscout"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
