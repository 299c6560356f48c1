//! Authenticated HTTP client for the BookStack REST API
//!
//! Thin wrapper over one long-lived `reqwest::Client`. Transient failures
//! (429 and 5xx gateway statuses, connect errors, timeouts) are retried
//! with exponential backoff below the client contract; exhaustion surfaces
//! as the typed API or transport error.

use crate::config::Config;
use crate::error::BookStackError;
use crate::DEFAULT_USER_AGENT;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Statuses retried as transient
const RETRY_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Maximum retries after the initial attempt
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (0.5s, 1s, 2s)
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Client for authenticated GET requests against `<base>/api/<endpoint>`
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    auth_header: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client from validated configuration
    ///
    /// Fails fast on missing or malformed configuration, before any
    /// network call.
    pub fn new(config: &Config) -> Result<Self, BookStackError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(BookStackError::ClientBuild)?;

        Ok(Self {
            base_url: config.base_url.clone(),
            auth_header: format!("Token {}:{}", config.token_id, config.token_secret),
            http,
        })
    }

    /// URL of an API endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// URL of a path in the BookStack UI
    ///
    /// Part of the client contract alongside [`ApiClient::export_markdown`];
    /// current flows take page links from search and page payloads instead.
    pub fn app_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// GET an API endpoint and parse the JSON body into a generic mapping
    ///
    /// A 2xx body that fails to parse as JSON is non-fatal and yields an
    /// empty mapping. A non-2xx response becomes [`BookStackError::Api`]
    /// with the message from the JSON error envelope when present, else
    /// the protocol reason phrase.
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, BookStackError> {
        let url = self.api_url(endpoint);
        let response = self.send_with_retry(&url, params).await?;
        let status = response.status();

        let data = match response.json::<Value>().await {
            Ok(value) => value,
            Err(_) => Value::Object(serde_json::Map::new()),
        };

        if !status.is_success() {
            let message = data
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| reason_phrase(status));
            return Err(BookStackError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(data)
    }

    /// GET `/pages/{id}/export-markdown` and return the raw export text
    ///
    /// Part of the client contract even though current flows prefer the
    /// markdown field on the page detail payload.
    pub async fn export_markdown(&self, page_id: u64) -> Result<String, BookStackError> {
        let url = self.api_url(&format!("pages/{}/export-markdown", page_id));
        let response = self.send_with_retry(&url, &[]).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(BookStackError::Api {
                status: status.as_u16(),
                message: reason_phrase(status),
            });
        }

        response.text().await.map_err(BookStackError::from_reqwest)
    }

    /// Send a GET request, retrying transient failures with backoff
    async fn send_with_retry(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, BookStackError> {
        let mut attempt: u32 = 0;
        loop {
            debug!(url, attempt, "GET");
            let result = self
                .http
                .get(url)
                .header(AUTHORIZATION, &self.auth_header)
                .query(params)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if RETRY_STATUSES.contains(&status) && attempt < MAX_RETRIES {
                        warn!(url, status, attempt, "transient status, retrying");
                    } else {
                        return Ok(response);
                    }
                }
                Err(err) if (err.is_timeout() || err.is_connect()) && attempt < MAX_RETRIES => {
                    warn!(url, attempt, error = %err, "transport error, retrying");
                }
                Err(err) => return Err(BookStackError::from_reqwest(err)),
            }

            tokio::time::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt)).await;
            attempt += 1;
        }
    }
}

/// Reason phrase for a status, with a fallback for unknown codes
fn reason_phrase(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&Config::new("https://docs.example.com/", "id", "secret")).unwrap()
    }

    #[test]
    fn test_api_url_joining() {
        let c = client();
        assert_eq!(c.api_url("search"), "https://docs.example.com/api/search");
        assert_eq!(c.api_url("/pages/7"), "https://docs.example.com/api/pages/7");
    }

    #[test]
    fn test_app_url_joining() {
        let c = client();
        assert_eq!(
            c.app_url("/books/ops"),
            "https://docs.example.com/books/ops"
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = ApiClient::new(&Config::new("", "id", "secret"));
        assert!(matches!(result, Err(BookStackError::MissingBaseUrl)));

        let result = ApiClient::new(&Config::new("https://docs.example.com", "", ""));
        assert!(matches!(result, Err(BookStackError::MissingCredentials)));
    }

    #[test]
    fn test_auth_header_format() {
        let c = client();
        assert_eq!(c.auth_header, "Token id:secret");
    }
}
