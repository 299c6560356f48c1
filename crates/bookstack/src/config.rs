//! Configuration for BookStack API access

use crate::error::BookStackError;
use std::time::Duration;
use url::Url;

/// Default per-request timeout
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a BookStack server
///
/// All fields are validated before the first network call; a missing URL or
/// credential fails the whole operation with a descriptive error.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the BookStack instance, without trailing slash
    pub base_url: String,
    /// API token id
    pub token_id: String,
    /// API token secret
    pub token_secret: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Config {
    /// Create a config with the default timeout
    ///
    /// A trailing slash on the base URL is stripped.
    pub fn new(
        base_url: impl Into<String>,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_id: token_id.into(),
            token_secret: token_secret.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read configuration from `BOOKSTACK_URL`, `BOOKSTACK_TOKEN_ID` and
    /// `BOOKSTACK_TOKEN_SECRET` environment variables
    pub fn from_env() -> Result<Self, BookStackError> {
        let base_url = std::env::var("BOOKSTACK_URL").unwrap_or_default();
        let token_id = std::env::var("BOOKSTACK_TOKEN_ID").unwrap_or_default();
        let token_secret = std::env::var("BOOKSTACK_TOKEN_SECRET").unwrap_or_default();
        let config = Self::new(base_url, token_id, token_secret);
        config.validate()?;
        Ok(config)
    }

    /// Validate that all required fields are present and the base URL is
    /// a well-formed http(s) URL
    pub fn validate(&self) -> Result<(), BookStackError> {
        if self.base_url.is_empty() {
            return Err(BookStackError::MissingBaseUrl);
        }
        if self.token_id.is_empty() || self.token_secret.is_empty() {
            return Err(BookStackError::MissingCredentials);
        }
        let parsed = Url::parse(&self.base_url)
            .map_err(|_| BookStackError::InvalidBaseUrl(self.base_url.clone()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(BookStackError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_stripped() {
        let config = Config::new("https://docs.example.com/", "id", "secret");
        assert_eq!(config.base_url, "https://docs.example.com");
    }

    #[test]
    fn test_validate_ok() {
        let config = Config::new("https://docs.example.com", "id", "secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_url() {
        let config = Config::new("", "id", "secret");
        assert!(matches!(
            config.validate(),
            Err(BookStackError::MissingBaseUrl)
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config::new("https://docs.example.com", "", "secret");
        assert!(matches!(
            config.validate(),
            Err(BookStackError::MissingCredentials)
        ));

        let config = Config::new("https://docs.example.com", "id", "");
        assert!(matches!(
            config.validate(),
            Err(BookStackError::MissingCredentials)
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config::new("not a url", "id", "secret");
        assert!(matches!(
            config.validate(),
            Err(BookStackError::InvalidBaseUrl(_))
        ));

        let config = Config::new("ftp://docs.example.com", "id", "secret");
        assert!(matches!(
            config.validate(),
            Err(BookStackError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_default_timeout() {
        let config = Config::new("https://docs.example.com", "id", "secret");
        assert_eq!(config.timeout, Duration::from_secs(30));

        let config = config.timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
