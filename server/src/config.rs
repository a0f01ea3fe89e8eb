//! Server configuration from environment variables.

use std::env;
use std::net::SocketAddr;

use videochef_core::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_PARALLEL_STEPS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Permits in the worker pool shared by every parallel step group.
    pub max_parallel_steps: usize,
    /// Video hosts accepted on submission. Empty means every supported host.
    pub allowed_hosts: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `VIDEOCHEF_BIND_ADDR`: listen address (default: 0.0.0.0:3000)
    /// - `VIDEOCHEF_MAX_PARALLEL_STEPS`: worker pool size (default: 8)
    /// - `VIDEOCHEF_ALLOWED_HOSTS`: comma-separated video hosts (used in tests)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = match lookup("VIDEOCHEF_BIND_ADDR") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| invalid("VIDEOCHEF_BIND_ADDR", &value))?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| invalid("VIDEOCHEF_BIND_ADDR", DEFAULT_BIND_ADDR))?,
        };

        let max_parallel_steps = match lookup("VIDEOCHEF_MAX_PARALLEL_STEPS") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("VIDEOCHEF_MAX_PARALLEL_STEPS", &value))?,
            None => DEFAULT_MAX_PARALLEL_STEPS,
        };

        let allowed_hosts = lookup("VIDEOCHEF_ALLOWED_HOSTS")
            .map(|value| {
                value
                    .split(',')
                    .map(|h| h.trim().to_ascii_lowercase())
                    .filter(|h| !h.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            max_parallel_steps,
            allowed_hosts,
        })
    }
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.max_parallel_steps, 8);
        assert!(config.allowed_hosts.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("VIDEOCHEF_BIND_ADDR", "127.0.0.1:8080"),
            ("VIDEOCHEF_MAX_PARALLEL_STEPS", "3"),
            ("VIDEOCHEF_ALLOWED_HOSTS", "youtu.be, WWW.YouTube.com,,"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.max_parallel_steps, 3);
        assert_eq!(config.allowed_hosts, vec!["youtu.be", "www.youtube.com"]);
    }

    #[test]
    fn rejects_bad_values() {
        let err = load(&[("VIDEOCHEF_MAX_PARALLEL_STEPS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref name, .. } if name == "VIDEOCHEF_MAX_PARALLEL_STEPS"
        ));
        assert!(load(&[("VIDEOCHEF_BIND_ADDR", "not-an-addr")]).is_err());
    }
}
