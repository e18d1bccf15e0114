use std::env;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://kgsearch.googleapis.com/v1/entities:search";
pub const DEFAULT_LIMIT: u32 = 10_000;
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const ENDPOINT_ENV: &str = "KG_SEARCH_ENDPOINT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing API key: set GOOGLE_API_KEY or pass --api-key")]
    MissingApiKey,
}

/// Everything the dispatcher needs to reach the entity-search API.
#[derive(Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: String,
    pub limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let key = env::var(API_KEY_ENV).unwrap_or_default();
        let mut config = Self::new(key)?;
        if let Some(endpoint) = env::var(ENDPOINT_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_rejected() {
        assert_eq!(SearchConfig::new("  ").unwrap_err(), ConfigError::MissingApiKey);
    }

    #[test]
    fn defaults_point_at_the_public_endpoint() {
        let config = SearchConfig::new("secret").unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.limit, 10_000);
        assert_eq!(config.api_key, "secret");
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = SearchConfig::new("super-secret-key").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
