use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AuthConfig {
    /// Expected `X-API-Key` value; auth is off when unset
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub requests_per_min: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from defaults plus whatever `lookup` returns for the known keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            // Server defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.workers", 4)?
            // Rate limiting defaults
            .set_default("rate_limit.requests_per_min", 60)?;

        if let Some(host) = lookup("SERVICE_HOST") {
            builder = builder.set_override("server.host", host)?;
        }

        // SERVICE_PORT wins over the PaaS-style PORT
        if let Some(port) = lookup("SERVICE_PORT").or_else(|| lookup("PORT")) {
            builder = builder.set_override("server.port", port)?;
        }

        if let Some(workers) = lookup("SERVICE_WORKERS") {
            builder = builder.set_override("server.workers", workers)?;
        }

        if let Some(api_key) = lookup("API_KEY").filter(|key| !key.trim().is_empty()) {
            builder = builder.set_override("auth.api_key", api_key)?;
        }

        if let Some(limit) = lookup("REQUESTS_PER_MIN") {
            builder = builder.set_override("rate_limit.requests_per_min", limit)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.workers == 0 {
            return Err(ConfigError::Message(
                "SERVICE_WORKERS must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.requests_per_min == 0 {
            return Err(ConfigError::Message(
                "REQUESTS_PER_MIN must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.workers, 4);
        assert!(config.auth.api_key.is_none());
        assert_eq!(config.rate_limit.requests_per_min, 60);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "9000"),
            ("API_KEY", "fraud2025"),
            ("REQUESTS_PER_MIN", "120"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.api_key.as_deref(), Some("fraud2025"));
        assert_eq!(config.rate_limit.requests_per_min, 120);
    }

    #[test]
    fn test_service_port_beats_port() {
        let config = load(&[("PORT", "9000"), ("SERVICE_PORT", "9100")]).unwrap();
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_blank_api_key_disables_auth() {
        let config = load(&[("API_KEY", "  ")]).unwrap();
        assert!(config.auth.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("SERVICE_PORT", "eighty")]).is_err());
        assert!(load(&[("REQUESTS_PER_MIN", "0")]).is_err());
        assert!(load(&[("REQUESTS_PER_MIN", "-3")]).is_err());
        assert!(load(&[("SERVICE_WORKERS", "0")]).is_err());
    }
}
