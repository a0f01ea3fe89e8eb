//! Extraction service configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default timeout for extraction calls (captions, details, steps, briefings).
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 120;

/// Default timeout for verify and cleanup calls.
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Base URL of the extraction service, without trailing slash.
    pub base_url: String,
    pub extraction_timeout: Duration,
    pub verify_timeout: Duration,
}

impl ExtractionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            extraction_timeout: Duration::from_secs(DEFAULT_EXTRACTION_TIMEOUT_SECS),
            verify_timeout: Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `VIDEOCHEF_EXTRACTION_URL`: base URL of the extraction service
    ///
    /// Optional:
    /// - `VIDEOCHEF_EXTRACTION_TIMEOUT_SECS`: extraction call timeout (default: 120)
    /// - `VIDEOCHEF_VERIFY_TIMEOUT_SECS`: verify/cleanup call timeout (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("VIDEOCHEF_EXTRACTION_URL")
            .map_err(|_| ConfigError::MissingEnvVar("VIDEOCHEF_EXTRACTION_URL".to_string()))?;

        let mut config = Self::new(base_url);
        config.extraction_timeout = Duration::from_secs(secs_from_env(
            "VIDEOCHEF_EXTRACTION_TIMEOUT_SECS",
            DEFAULT_EXTRACTION_TIMEOUT_SECS,
        )?);
        config.verify_timeout = Duration::from_secs(secs_from_env(
            "VIDEOCHEF_VERIFY_TIMEOUT_SECS",
            DEFAULT_VERIFY_TIMEOUT_SECS,
        )?);
        Ok(config)
    }
}

fn secs_from_env(name: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_secs(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slash() {
        let config = ExtractionConfig::new("http://localhost:8000/");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.extraction_timeout, Duration::from_secs(120));
        assert_eq!(config.verify_timeout, Duration::from_secs(30));
    }

    #[test]
    fn parse_secs_rejects_garbage_and_zero() {
        assert_eq!(parse_secs("X", " 45 ").unwrap(), 45);
        assert!(matches!(
            parse_secs("X", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(parse_secs("X", "0").is_err());
    }
}
