//! Configuration management for `TravelBuddy` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TravelBuddyError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const AMADEUS_TEST_URL: &str = "https://test.api.amadeus.com";
const AMADEUS_PRODUCTION_URL: &str = "https://api.amadeus.com";

/// Root configuration structure for the `TravelBuddy` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelBuddyConfig {
    /// Web server settings
    pub server: ServerConfig,
    /// Amadeus Self-Service API settings
    pub amadeus: AmadeusConfig,
    /// Chat-completions endpoint settings
    pub llm: LlmConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Pipeline defaults
    pub planner: PlannerConfig,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `index.html` and other static assets
    pub static_dir: String,
    /// Upper bound for a whole `/api/plan` round trip
    pub request_timeout_seconds: u32,
    /// PEM certificate chain, enables TLS together with `tls_key`
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
}

/// Amadeus Self-Service API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmadeusConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// `test` or `production`
    pub environment: String,
    /// Overrides the URL derived from `environment`
    pub base_url: Option<String>,
    pub timeout_seconds: u32,
    /// Retries for transient failures (connect errors, 5xx, 429)
    pub max_retries: u32,
}

/// OpenAI-compatible chat-completions settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u32,
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory location, `~` is expanded
    pub location: String,
    /// TTL for IATA codes and airline names in hours
    pub reference_ttl_hours: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP/HTTP collector endpoint; traces are exported only when set
    pub otlp_endpoint: Option<String>,
}

/// Defaults applied by the planning pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Origin used when neither the request nor `home_iata` has one
    pub default_origin: String,
    pub default_currency: String,
    /// Share of the total budget a hotel stay may take
    pub hotel_budget_share: f64,
    pub max_flight_results: u32,
    /// Number of hotel ids passed on to the offers search
    pub max_hotels: usize,
    pub adults: u32,
    pub travel_class: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            static_dir: "static".to_string(),
            request_timeout_seconds: 180,
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            environment: "test".to_string(),
            base_url: None,
            timeout_seconds: 30,
            max_retries: 2,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            timeout_seconds: 60,
            max_retries: 2,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: "~/.cache/travelbuddy".to_string(),
            reference_ttl_hours: 24 * 7,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            otlp_endpoint: None,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_origin: "LHE".to_string(),
            default_currency: "USD".to_string(),
            hotel_budget_share: 0.15,
            max_flight_results: 20,
            max_hotels: 40,
            adults: 1,
            travel_class: "ECONOMY".to_string(),
        }
    }
}

impl AmadeusConfig {
    /// Base URL for the configured environment unless explicitly overridden
    #[must_use]
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.is_empty()) {
            return url.trim_end_matches('/').to_string();
        }
        if self.environment.eq_ignore_ascii_case("production") {
            AMADEUS_PRODUCTION_URL.to_string()
        } else {
            AMADEUS_TEST_URL.to_string()
        }
    }
}

impl CacheConfig {
    /// Cache directory with a leading `~` expanded to the home directory
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.location),
        }
    }
}

impl TravelBuddyConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var("TRAVELBUDDY_CONFIG").ok().map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|p| p.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRAVELBUDDY_AMADEUS__API_KEY style overrides
        builder = builder.add_source(
            Environment::with_prefix("TRAVELBUDDY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TravelBuddyConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_credential_fallbacks(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travelbuddy").join("config.toml"))
    }

    /// Fill unset credentials from the conventional variables
    /// (`AMADEUS_API_KEY`, `AMADEUS_API_SECRET`, `AMADEUS_ENV`, `GROQ_API_KEY`).
    pub fn apply_credential_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.amadeus.api_key.is_none() {
            self.amadeus.api_key = lookup("AMADEUS_API_KEY");
        }
        if self.amadeus.api_secret.is_none() {
            self.amadeus.api_secret = lookup("AMADEUS_API_SECRET");
        }
        if let Some(env) = lookup("AMADEUS_ENV") {
            if self.amadeus.environment.is_empty() || self.amadeus.environment == "test" {
                self.amadeus.environment = env.to_lowercase();
            }
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup("GROQ_API_KEY");
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        let server = ServerConfig::default();
        let amadeus = AmadeusConfig::default();
        let llm = LlmConfig::default();
        let cache = CacheConfig::default();
        let logging = LoggingConfig::default();
        let planner = PlannerConfig::default();

        if self.server.port == 0 {
            self.server.port = server.port;
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = server.static_dir;
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = server.request_timeout_seconds;
        }
        if self.amadeus.environment.is_empty() {
            self.amadeus.environment = amadeus.environment;
        }
        if self.amadeus.timeout_seconds == 0 {
            self.amadeus.timeout_seconds = amadeus.timeout_seconds;
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = llm.base_url;
        }
        if self.llm.model.is_empty() {
            self.llm.model = llm.model;
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = llm.timeout_seconds;
        }
        if self.cache.location.is_empty() {
            self.cache.location = cache.location;
        }
        if self.cache.reference_ttl_hours == 0 {
            self.cache.reference_ttl_hours = cache.reference_ttl_hours;
        }
        if self.logging.level.is_empty() {
            self.logging.level = logging.level;
        }
        if self.logging.format.is_empty() {
            self.logging.format = logging.format;
        }
        if self.planner.default_origin.is_empty() {
            self.planner.default_origin = planner.default_origin;
        }
        if self.planner.default_currency.is_empty() {
            self.planner.default_currency = planner.default_currency;
        }
        if self.planner.travel_class.is_empty() {
            self.planner.travel_class = planner.travel_class;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials that are present
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("Amadeus API key", &self.amadeus.api_key),
            ("Amadeus API secret", &self.amadeus.api_secret),
            ("LLM API key", &self.llm.api_key),
        ];
        for (label, key) in keys {
            if let Some(key) = key {
                if key.trim().is_empty() {
                    return Err(TravelBuddyError::config(format!(
                        "{label} cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.amadeus.timeout_seconds > 300 || self.llm.timeout_seconds > 300 {
            return Err(TravelBuddyError::config("API timeouts cannot exceed 300 seconds").into());
        }

        if self.amadeus.max_retries > 10 || self.llm.max_retries > 10 {
            return Err(TravelBuddyError::config("API max retries cannot exceed 10").into());
        }

        if !(self.planner.hotel_budget_share > 0.0 && self.planner.hotel_budget_share <= 1.0) {
            return Err(TravelBuddyError::config(
                "Hotel budget share must be greater than 0 and at most 1",
            )
            .into());
        }

        if !(1..=250).contains(&self.planner.max_flight_results) {
            return Err(
                TravelBuddyError::config("Flight results must be between 1 and 250").into(),
            );
        }

        if !(1..=100).contains(&self.planner.max_hotels) {
            return Err(TravelBuddyError::config("Hotel count must be between 1 and 100").into());
        }

        if !(1..=9).contains(&self.planner.adults) {
            return Err(TravelBuddyError::config("Adults must be between 1 and 9").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelBuddyError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelBuddyError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_environments = ["test", "production"];
        if !valid_environments.contains(&self.amadeus.environment.as_str()) {
            return Err(TravelBuddyError::config(format!(
                "Invalid Amadeus environment '{}'. Must be one of: {}",
                self.amadeus.environment,
                valid_environments.join(", ")
            ))
            .into());
        }

        let valid_classes = ["ECONOMY", "PREMIUM_ECONOMY", "BUSINESS", "FIRST"];
        if !valid_classes.contains(&self.planner.travel_class.as_str()) {
            return Err(TravelBuddyError::config(format!(
                "Invalid travel class '{}'. Must be one of: {}",
                self.planner.travel_class,
                valid_classes.join(", ")
            ))
            .into());
        }

        let currency = &self.planner.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(TravelBuddyError::config(
                "Default currency must be a three-letter ISO code such as USD",
            )
            .into());
        }

        let urls = [
            ("LLM base URL", Some(self.llm.base_url.as_str())),
            ("Amadeus base URL", self.amadeus.base_url.as_deref()),
            ("OTLP endpoint", self.logging.otlp_endpoint.as_deref()),
        ];
        for (label, url) in urls {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(TravelBuddyError::config(format!(
                        "{label} must be a valid HTTP or HTTPS URL"
                    ))
                    .into());
                }
            }
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(TravelBuddyError::config(
                "TLS needs both server.tls_cert and server.tls_key",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TravelBuddyConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.amadeus.environment, "test");
        assert_eq!(config.llm.model, "llama3-8b-8192");
        assert_eq!(config.planner.default_origin, "LHE");
        assert_eq!(config.planner.hotel_budget_share, 0.15);
        assert!(config.amadeus.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_amadeus_base_url_follows_environment() {
        let mut config = AmadeusConfig::default();
        assert_eq!(config.resolved_base_url(), "https://test.api.amadeus.com");

        config.environment = "production".to_string();
        assert_eq!(config.resolved_base_url(), "https://api.amadeus.com");

        config.base_url = Some("http://127.0.0.1:9000/".to_string());
        assert_eq!(config.resolved_base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_credential_fallbacks() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("AMADEUS_API_KEY", "key-from-env"),
            ("AMADEUS_API_SECRET", "secret-from-env"),
            ("AMADEUS_ENV", "PRODUCTION"),
            ("GROQ_API_KEY", "   "),
        ]);

        let mut config = TravelBuddyConfig::default();
        config.amadeus.api_secret = Some("configured-secret".to_string());
        config.apply_credential_fallbacks(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.amadeus.api_key.as_deref(), Some("key-from-env"));
        assert_eq!(config.amadeus.api_secret.as_deref(), Some("configured-secret"));
        assert_eq!(config.amadeus.environment, "production");
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TravelBuddyConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TravelBuddyConfig::default();
        config.amadeus.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeouts cannot exceed"));

        let mut config = TravelBuddyConfig::default();
        config.planner.hotel_budget_share = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_key() {
        let mut config = TravelBuddyConfig::default();
        config.llm.api_key = Some(String::new());
        let result = config.validate_api_keys();
        assert!(result.unwrap_err().to_string().contains("LLM API key"));
    }

    #[test]
    fn test_config_validation_tls_pair() {
        let mut config = TravelBuddyConfig::default();
        config.server.tls_cert = Some("cert.pem".to_string());
        assert!(config.validate().is_err());
        config.server.tls_key = Some("key.pem".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[planner]\ndefault_origin = \"KHI\"\nmax_hotels = 10\n\n[amadeus]\napi_key = \"abc12345\"\napi_secret = \"def67890\""
        )
        .unwrap();

        let config = TravelBuddyConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.planner.default_origin, "KHI");
        assert_eq!(config.planner.max_hotels, 10);
        assert_eq!(config.amadeus.api_key.as_deref(), Some("abc12345"));
        // untouched sections keep their defaults
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_cache_location_expands_home() {
        let config = CacheConfig::default();
        let path = config.resolved_location();
        assert!(path.ends_with(".cache/travelbuddy"));
        assert!(!path.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_config_path_generation() {
        let path = TravelBuddyConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("travelbuddy"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
