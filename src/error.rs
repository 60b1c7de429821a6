// Error handling module
// Defines the errors raised while authenticating and forwarding requests

use thiserror::Error;

/// Errors that can occur while talking to the Pentadata API
#[derive(Error, Debug)]
pub enum Error {
    /// Login endpoint rejected the credentials
    #[error("Credentials not valid (login returned {status})")]
    Authentication { status: u16 },

    /// Refresh endpoint rejected the refresh token
    #[error("Cannot refresh token (refresh returned {status})")]
    Refresh { status: u16 },

    /// Token response carried an expiry that is not `YYYYMMDDHHMMSS`
    #[error("Invalid expiry timestamp: {0}")]
    InvalidExpiry(String),

    /// Domain or request URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Bearer token could not be encoded as a header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Sending the request or decoding its body failed
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// True for the two token lifecycle failures (login or refresh rejected)
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Authentication { .. } | Error::Refresh { .. })
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;
