//! Configuration management for the inventory gateway
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with WIMS_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    /// ERP backend the gateway talks to
    pub upstream: UpstreamConfig,

    pub session: SessionConfig,

    pub valuation: ValuationConfig,

    pub listing: ListingConfig,

    pub cache: CacheConfig,

    pub reports: ReportsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the ERP REST API, e.g. `http://erp.local/api`
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Secret the ERP backend signs session tokens with
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValuationConfig {
    /// Relative divergence that flags a valuation row
    pub alert_threshold: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    /// Fixed page size of list screens
    pub page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// How long a cached list stays fresh
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Days without movement before an item counts as stagnant
    pub stagnant_days: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("WIMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Self::build(
            &environment,
            Environment::with_prefix("WIMS")
                .separator("__")
                .try_parsing(true),
        )
    }

    /// The session secret has no default: the gateway refuses to start without it
    fn build(environment: &str, overrides: Environment) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment)?
            .set_default("server.port", 8080)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("upstream.base_url", "http://localhost:3000/api")?
            .set_default("upstream.timeout_secs", 30)?
            .set_default("valuation.alert_threshold", "0.15")?
            .set_default("listing.page_size", 10)?
            .set_default("cache.ttl_secs", 60)?
            .set_default("reports.stagnant_days", 90)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WIMS_ prefix)
            .add_source(overrides)
            .build()?;

        let config: Self = config.try_deserialize()?;
        if config.session.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "session.jwt_secret must not be empty".to_string(),
            ));
        }
        if let Err(m) = shared::validate_alert_threshold(config.valuation.alert_threshold) {
            return Err(ConfigError::Message(format!("valuation.alert_threshold: {}", m)));
        }
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Config {
    /// Configuration pointing at a given upstream, used by tests and tools
    pub fn for_upstream(base_url: impl Into<String>) -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            upstream: UpstreamConfig {
                base_url: base_url.into(),
                timeout_secs: 5,
            },
            session: SessionConfig {
                jwt_secret: "test-secret".to_string(),
            },
            valuation: ValuationConfig {
                alert_threshold: shared::DEFAULT_ALERT_THRESHOLD,
            },
            listing: ListingConfig { page_size: 10 },
            cache: CacheConfig { ttl_secs: 60 },
            reports: ReportsConfig {
                stagnant_days: shared::DEFAULT_STAGNANT_DAYS,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Environment {
        Environment::with_prefix("WIMS")
            .separator("__")
            .try_parsing(true)
            .source(Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ))
    }

    #[test]
    fn test_missing_session_secret_is_an_error() {
        assert!(Config::build("test", vars(&[])).is_err());
        assert!(Config::build("test", vars(&[("WIMS__SESSION__JWT_SECRET", "  ")])).is_err());
        assert!(Config::build(
            "test",
            vars(&[
                ("WIMS__SESSION__JWT_SECRET", "s3cret"),
                ("WIMS__VALUATION__ALERT_THRESHOLD", "0"),
            ])
        )
        .is_err());
    }

    #[test]
    fn test_defaults_with_secret() {
        let config = Config::build(
            "test",
            vars(&[
                ("WIMS__SESSION__JWT_SECRET", "s3cret"),
                ("WIMS__LISTING__PAGE_SIZE", "25"),
            ]),
        )
        .unwrap();
        assert_eq!(config.session.jwt_secret, "s3cret");
        assert_eq!(config.listing.page_size, 25);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.valuation.alert_threshold, shared::DEFAULT_ALERT_THRESHOLD);
    }
}
