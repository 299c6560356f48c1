//! Error types for the BookStack tool

use thiserror::Error;

/// Errors that can occur while talking to BookStack
#[derive(Debug, Error)]
pub enum BookStackError {
    /// Base URL is not configured
    #[error("BOOKSTACK_URL is not configured. Set the BookStack base URL (without trailing slash)")]
    MissingBaseUrl,

    /// Token id or secret is not configured
    #[error("BookStack API credentials are not configured. Set BOOKSTACK_TOKEN_ID and BOOKSTACK_TOKEN_SECRET")]
    MissingCredentials,

    /// Base URL does not parse as an http(s) URL
    #[error("Invalid BookStack base URL: {0}")]
    InvalidBaseUrl(String),

    /// Unknown page format requested
    #[error("Invalid format {0:?}: must be markdown, text or html")]
    InvalidFormat(String),

    /// Non-2xx API response with status and server-provided message
    #[error("BookStack API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// Page fetched successfully but yielded no body text
    #[error("No content available for page {0}")]
    EmptyPage(u64),

    /// Failed to build the HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Request timed out at the transport level
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to the server
    #[error("Failed to connect to server")]
    Connect(#[source] reqwest::Error),

    /// Other transport error
    #[error("Request failed: {0}")]
    Transport(String),
}

impl BookStackError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BookStackError::Timeout
        } else if err.is_connect() {
            BookStackError::Connect(err)
        } else {
            BookStackError::Transport(err.to_string())
        }
    }

    /// HTTP status for typed API errors, `None` otherwise
    pub fn status(&self) -> Option<u16> {
        match self {
            BookStackError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
