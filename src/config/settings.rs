//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Every field has a sensible default so the server runs with no config
//! file at all; only live report generation needs a real credential.

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Upstream review service settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Local review agent settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("upstream.base_url", &self.upstream.base_url),
            ("agent.base_url", &self.agent.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} must start with http:// or https:// (got '{url}')"),
                });
            }
        }

        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "upstream.timeout_secs must be greater than zero".to_string(),
            });
        }

        if self.agent.health_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "agent.health_timeout_secs must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Upstream review service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Base URL of the review service API.
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,

    /// API credential for the review service. May also be supplied via the
    /// `REVIEW_PILOT_API_KEY` environment variable at startup.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout for report generation calls, in seconds.
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            api_key: None,
            timeout_secs: default_upstream_timeout(),
        }
    }
}

fn default_upstream_base_url() -> String {
    "https://api.reviewpilot.dev/v1".to_string()
}

const fn default_upstream_timeout() -> u64 {
    30
}

/// Local review agent configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Base URL of the in-IDE review agent.
    #[serde(default = "default_agent_base_url")]
    pub base_url: String,

    /// Timeout for the `/health` probe, in seconds.
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: default_agent_base_url(),
            health_timeout_secs: default_health_timeout(),
        }
    }
}

fn default_agent_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

const fn default_health_timeout() -> u64 {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.upstream.base_url, "https://api.reviewpilot.dev/v1");
        assert_eq!(config.agent.base_url, "http://127.0.0.1:8080");
        assert!(config.upstream.api_key.is_none());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "upstream": {
                "base_url": "https://review.example.com/api",
                "api_key": "test-key",
                "timeout_secs": 10
            },
            "agent": {
                "base_url": "http://localhost:9090",
                "health_timeout_secs": 2
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.upstream.base_url, "https://review.example.com/api");
        assert_eq!(config.upstream.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.upstream.timeout_secs, 10);
        assert_eq!(config.agent.base_url, "http://localhost:9090");
        assert_eq!(config.agent.health_timeout_secs, 2);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn upstream_config_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url, "https://api.reviewpilot.dev/v1");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_non_http_base_url() {
        let json = r#"{
            "upstream": { "base_url": "ftp://review.example.com" }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_zero_timeout() {
        let json = r#"{
            "upstream": { "timeout_secs": 0 }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
