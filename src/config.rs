use crate::domain::error::ClientError;
use crate::domain::values::resource::Resource;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(300);

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Validates `base_url` and drops any trailing slash so paths can be appended.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        url::Url::parse(trimmed)?;
        Ok(Self {
            base_url: trimmed.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `FINBOARD_API_URL` and `FINBOARD_TIMEOUT_SECS`, with hard-coded fallbacks.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("FINBOARD_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let config = Self::new(&base_url)?;
        match std::env::var("FINBOARD_TIMEOUT_SECS") {
            Ok(raw) => Ok(config.with_timeout(parse_secs("FINBOARD_TIMEOUT_SECS", &raw)?)),
            Err(_) => Ok(config),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Cache tuning: how long entries outlive their last subscriber and how long
/// a response stays fresh.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub retention: Duration,
    freshness: HashMap<Resource, Duration>,
}

impl CacheConfig {
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Override the freshness window of one resource.
    pub fn with_freshness(mut self, resource: Resource, window: Duration) -> Self {
        self.freshness.insert(resource, window);
        self
    }

    pub fn freshness(&self, resource: Resource) -> Duration {
        self.freshness
            .get(&resource)
            .copied()
            .unwrap_or_else(|| resource.freshness())
    }

    /// `FINBOARD_RETENTION_SECS`, falling back to five minutes.
    pub fn from_env() -> Result<Self, ClientError> {
        match std::env::var("FINBOARD_RETENTION_SECS") {
            Ok(raw) => Ok(Self::default().with_retention(parse_secs("FINBOARD_RETENTION_SECS", &raw)?)),
            Err(_) => Ok(Self::default()),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            freshness: HashMap::new(),
        }
    }
}

fn parse_secs(var: &str, raw: &str) -> Result<Duration, ClientError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ClientError::Config(format!("{var} must be a whole number of seconds, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_dropped() {
        let config = ClientConfig::new("http://example.com/api/").unwrap();
        assert_eq!(config.base_url, "http://example.com/api");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(ClientConfig::new("not a url"), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_freshness_override() {
        let config = CacheConfig::default().with_freshness(Resource::CryptoList, Duration::from_secs(5));
        assert_eq!(config.freshness(Resource::CryptoList), Duration::from_secs(5));
        assert_eq!(config.freshness(Resource::News), Resource::News.freshness());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("X", " 15 ").unwrap(), Duration::from_secs(15));
        assert!(parse_secs("X", "soon").is_err());
    }
}
