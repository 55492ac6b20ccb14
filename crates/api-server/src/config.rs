use anyhow::{Context, Result};
use mindsdb_client::MindsDbConfig;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_CACHE_TTL_SECS: u64 = 86_400; // 24 hours
const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    // Top-growth response cache
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,

    /// Timeout applied to every outbound call
    pub upstream_timeout_secs: u64,

    // MindsDB
    pub mindsdb_url: String,
    pub mindsdb_login: Option<String>,
    pub mindsdb_password: Option<String>,
    pub mindsdb_model: String,
    pub mindsdb_table: String,

    // Cohere
    pub cohere_api_key: String,
    pub cohere_url: Option<String>,
    pub cohere_model: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = MindsDbConfig::default();

        let config = Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,

            cache_ttl_secs: var("CACHE_TTL_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("CACHE_TTL_SECS must be an integer")?
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,

            upstream_timeout_secs: var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|| "60".to_string())
                .parse::<u64>()
                .context("UPSTREAM_TIMEOUT_SECS must be an integer")?,

            mindsdb_url: var("MINDSDB_URL").unwrap_or(defaults.base_url),
            mindsdb_login: var("MINDSDB_LOGIN"),
            mindsdb_password: var("MINDSDB_PASSWORD"),
            mindsdb_model: var("MINDSDB_MODEL")
                .unwrap_or_else(|| forecast_core::sql::DEFAULT_MODEL.to_string()),
            mindsdb_table: var("MINDSDB_TABLE")
                .unwrap_or_else(|| forecast_core::sql::DEFAULT_TABLE.to_string()),

            cohere_api_key: var("COHERE_API_KEY").context("COHERE_API_KEY must be set")?,
            cohere_url: var("COHERE_URL"),
            cohere_model: var("COHERE_MODEL"),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs == 0 {
            anyhow::bail!("CACHE_TTL_SECS must be greater than zero");
        }
        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
        }
        if self.mindsdb_login.is_some() && self.mindsdb_password.is_none() {
            anyhow::bail!("MINDSDB_PASSWORD must be set when MINDSDB_LOGIN is set");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn mindsdb(&self) -> MindsDbConfig {
        MindsDbConfig {
            base_url: self.mindsdb_url.clone(),
            login: self.mindsdb_login.clone(),
            password: self.mindsdb_password.clone(),
            timeout: self.upstream_timeout(),
        }
    }

    pub fn cohere(&self) -> cohere_client::CohereConfig {
        let mut config = cohere_client::CohereConfig::new(self.cohere_api_key.clone())
            .with_timeout(self.upstream_timeout());
        if let Some(url) = &self.cohere_url {
            config.base_url = url.clone();
        }
        config.model = self.cohere_model.clone();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("COHERE_API_KEY", "key")]).unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8000");
        assert_eq!(config.cache_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.cache_capacity, 128);
        assert_eq!(config.mindsdb_model, "crypto_predictor_new");
        assert_eq!(config.mindsdb_table, "crypto_prices");
        assert_eq!(config.mindsdb().base_url, "https://cloud.mindsdb.com");
        assert!(config.mindsdb().login.is_none());
    }

    #[test]
    fn test_missing_cohere_key_is_rejected() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("COHERE_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("COHERE_API_KEY", "key"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9100"),
            ("CACHE_TTL_SECS", "60"),
            ("MINDSDB_LOGIN", "me@example.com"),
            ("MINDSDB_PASSWORD", "pw"),
            ("COHERE_MODEL", "command"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 9100);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.mindsdb().login.as_deref(), Some("me@example.com"));
        assert_eq!(config.cohere().model.as_deref(), Some("command"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("COHERE_API_KEY", "k"), ("PORT", "http")]).is_err());
        assert!(config_from(&[("COHERE_API_KEY", "k"), ("CACHE_TTL_SECS", "0")]).is_err());
        assert!(config_from(&[("COHERE_API_KEY", "k"), ("MINDSDB_LOGIN", "me")]).is_err());
    }
}
