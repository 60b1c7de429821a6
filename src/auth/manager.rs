use chrono::Utc;
use reqwest::{Client, Method, Response, Url};
use tokio::sync::RwLock;

use super::endpoints;
use super::expiry;
use super::types::{Credentials, Session};
use crate::error::{Error, Result};
use crate::http_client::{self, RequestOptions};

/// Production API domain
pub const DEFAULT_DOMAIN: &str = "https://api.pentadatainc.com";

/// Token manager
/// Logs in on construction and keeps the bearer token fresh for every request
///
/// Freshness is checked lazily on each call; there are no background timers.
/// Renewal happens under the session write lock and re-checks freshness once
/// the lock is held, so overlapping callers renew at most once per stale period.
pub struct TokenManager {
    /// Subscriber credentials, reused for re-login
    credentials: Credentials,

    /// Current token pair
    session: RwLock<Session>,

    /// Base URL for login, refresh and relative request paths
    domain: Url,

    /// Shared HTTP client
    client: Client,
}

impl TokenManager {
    /// Build an HTTP client with the given timeouts and log in
    pub async fn new(
        credentials: Credentials,
        domain: &str,
        connect_timeout: u64,
        request_timeout: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(connect_timeout))
            .timeout(std::time::Duration::from_secs(request_timeout))
            .build()?;

        Self::with_client(credentials, domain, client).await
    }

    /// Log in using an existing HTTP client
    /// Fails with `Error::Authentication` if the credentials are rejected.
    pub async fn with_client(credentials: Credentials, domain: &str, client: Client) -> Result<Self> {
        let domain =
            Url::parse(domain).map_err(|e| Error::InvalidUrl(format!("{}: {}", domain, e)))?;

        tracing::info!("Authenticating against {}", domain);
        let session = endpoints::login(&client, &domain, &credentials).await?;

        Ok(Self {
            credentials,
            session: RwLock::new(session),
            domain,
            client,
        })
    }

    /// Log in again with the original credentials, replacing the whole session
    /// On failure the previous session is left untouched.
    pub async fn login(&self) -> Result<()> {
        let mut session = self.session.write().await;
        *session = endpoints::login(&self.client, &self.domain, &self.credentials).await?;
        Ok(())
    }

    /// Renew the access token
    /// Re-logs in instead when the refresh token itself is expired.
    pub async fn refresh(&self) -> Result<()> {
        let mut session = self.session.write().await;
        self.refresh_session(&mut session).await
    }

    async fn refresh_session(&self, session: &mut Session) -> Result<()> {
        if expiry::is_expired(session.refresh_expires, Utc::now()) {
            tracing::warn!(
                "Refresh token expired at {}, logging in again",
                session.refresh_expires.to_rfc3339()
            );
            *session = endpoints::login(&self.client, &self.domain, &self.credentials).await?;
            return Ok(());
        }

        let token = endpoints::refresh(&self.client, &self.domain, &session.refresh_token).await?;
        session.access_token = token.token;
        session.access_expires = token.expires;
        Ok(())
    }

    /// Check if the access token is expired or within the safety margin
    pub async fn is_access_expired(&self) -> bool {
        let session = self.session.read().await;
        expiry::is_expired(session.access_expires, Utc::now())
    }

    /// Check if the refresh token is expired or within the safety margin
    pub async fn is_refresh_expired(&self) -> bool {
        let session = self.session.read().await;
        expiry::is_expired(session.refresh_expires, Utc::now())
    }

    /// Get a usable access token, renewing the session first if needed
    pub async fn access_token(&self) -> Result<String> {
        {
            let session = self.session.read().await;
            if !needs_renewal(&session) {
                return Ok(session.access_token.clone());
            }
        }

        let mut session = self.session.write().await;
        // Another caller may have renewed while we waited for the lock
        if needs_renewal(&session) {
            tracing::debug!("Session stale, renewing before request");
            self.refresh_session(&mut session).await?;
        }
        Ok(session.access_token.clone())
    }

    /// Send an authenticated request
    ///
    /// `url` may be absolute or relative to the domain. The response is
    /// returned as received, whatever its status.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let url = http_client::resolve_url(&self.domain, url)?;
        let token = self.access_token().await?;

        tracing::debug!(method = %method, url = %url, "Sending HTTP request");
        let response = http_client::build_request(&self.client, method, url, options, &token)?
            .send()
            .await?;
        tracing::debug!(status = %response.status(), "Received HTTP response");

        Ok(response)
    }

    /// GET method
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET, url, options).await
    }

    /// POST method
    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::POST, url, options).await
    }

    /// PUT method
    pub async fn put(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::PUT, url, options).await
    }

    /// DELETE method
    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::DELETE, url, options).await
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub fn domain(&self) -> &Url {
        &self.domain
    }

    pub fn email(&self) -> &str {
        &self.credentials.email
    }
}

/// A stale access token needs a refresh; a stale refresh token needs a re-login
fn needs_renewal(session: &Session) -> bool {
    let now = Utc::now();
    expiry::is_expired(session.access_expires, now) || expiry::is_expired(session.refresh_expires, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn manager_with(access_in: i64, refresh_in: i64) -> TokenManager {
        let now = Utc::now();
        TokenManager {
            credentials: Credentials::new("a@b.com", "k"),
            session: RwLock::new(Session {
                access_token: "T1".to_string(),
                access_expires: now + Duration::seconds(access_in),
                refresh_token: "R1".to_string(),
                refresh_expires: now + Duration::seconds(refresh_in),
            }),
            domain: Url::parse(DEFAULT_DOMAIN).unwrap(),
            client: Client::new(),
        }
    }

    #[tokio::test]
    async fn test_access_expiration_check() {
        // 10 minutes left
        let manager = manager_with(600, 3600);
        assert!(!manager.is_access_expired().await);
        assert!(!manager.is_refresh_expired().await);

        // Inside the 5 second margin
        let manager = manager_with(3, 3600);
        assert!(manager.is_access_expired().await);
        assert!(!manager.is_refresh_expired().await);

        // Already past
        let manager = manager_with(-60, 3600);
        assert!(manager.is_access_expired().await);
    }

    #[tokio::test]
    async fn test_refresh_expiration_check() {
        let manager = manager_with(600, 2);
        assert!(!manager.is_access_expired().await);
        assert!(manager.is_refresh_expired().await);

        let manager = manager_with(600, -1);
        assert!(manager.is_refresh_expired().await);
    }

    #[tokio::test]
    async fn test_needs_renewal() {
        assert!(!needs_renewal(&manager_with(600, 3600).session().await));
        assert!(needs_renewal(&manager_with(1, 3600).session().await));
        assert!(needs_renewal(&manager_with(600, 1).session().await));
        assert!(needs_renewal(&manager_with(-10, -10).session().await));
    }

    #[tokio::test]
    async fn test_fresh_session_returns_token_without_network() {
        // Client::new() pointed at the real domain; no request is made while fresh
        let manager = manager_with(600, 3600);
        assert_eq!(manager.access_token().await.unwrap(), "T1");
    }

    #[test]
    fn test_accessors() {
        let manager = manager_with(600, 3600);
        assert_eq!(manager.email(), "a@b.com");
        assert_eq!(manager.domain().as_str(), "https://api.pentadatainc.com/");
    }
}
