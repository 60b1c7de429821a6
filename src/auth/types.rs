// Authentication types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscriber credentials, fixed for the lifetime of a manager
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
        }
    }
}

// Keep the api key out of logs and panic messages
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Current token pair and their absolute UTC expiries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub access_expires: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires: DateTime<Utc>,
}

/// Login request body
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub api_key: &'a str,
}

/// Login response body, expiries as `YYYYMMDDHHMMSS`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires: String,
    pub refresh_token: String,
    pub refresh_expires: String,
}

/// Refresh response body
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
    pub expires: String,
}

/// New access token obtained from the refresh endpoint
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}
