//! Configuration management for the FishCast server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FISHCAST_ prefix

use config::{ConfigError, Environment, File};
use fishcast_engine::StabilityConfig;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Day-over-day damping of per-day scores
    #[serde(default)]
    pub stability: StabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    pub forecast_url: String,

    /// Trailing days fetched for the water temperature model
    pub history_days: u32,

    /// Forecast days fetched when the caller does not ask for fewer
    pub forecast_days: u32,

    /// Per-request timeout
    pub request_timeout_secs: u64,
}

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FISHCAST_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.forecast_url", DEFAULT_FORECAST_URL)?
            .set_default("weather.history_days", 7)?
            .set_default("weather.forecast_days", 7)?
            .set_default("weather.request_timeout_secs", 10)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FISHCAST_ prefix)
            .add_source(
                Environment::with_prefix("FISHCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            history_days: 7,
            forecast_days: 7,
            request_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_files() {
        let config = Config::load().unwrap();
        assert_eq!(config.weather.history_days, 7);
        assert!(config.weather.forecast_url.starts_with("https://"));
        assert_eq!(config.stability, StabilityConfig::default());
    }
}
