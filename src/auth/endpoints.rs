// Login and refresh calls against the Subscribers API

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};

use super::expiry::parse_expiry;
use super::types::{AccessToken, Credentials, LoginRequest, LoginResponse, RefreshResponse, Session};
use crate::error::{Error, Result};

/// Login path, joined onto the domain
pub const LOGIN_PATH: &str = "subscribers/login";

/// Refresh path, joined onto the domain
pub const REFRESH_PATH: &str = "subscribers/refresh";

fn endpoint_url(domain: &Url, path: &str) -> Result<Url> {
    domain
        .join(path)
        .map_err(|e| Error::InvalidUrl(format!("{}{}: {}", domain, path, e)))
}

/// First few characters of a secret, for log lines
pub(crate) fn token_prefix(token: &str) -> String {
    token.chars().take(8).collect()
}

/// Exchange email + api key for a full session
pub async fn login(client: &Client, domain: &Url, creds: &Credentials) -> Result<Session> {
    let url = endpoint_url(domain, LOGIN_PATH)?;
    tracing::debug!(url = %url, email = %creds.email, "Logging in");

    let response = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .json(&LoginRequest {
            email: &creds.email,
            api_key: &creds.api_key,
        })
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(
            status = status.as_u16(),
            body = %error_text,
            "Login rejected"
        );
        return Err(Error::Authentication {
            status: status.as_u16(),
        });
    }

    let data: LoginResponse = response.json().await?;
    let session = Session {
        access_expires: parse_expiry(&data.expires)?,
        refresh_expires: parse_expiry(&data.refresh_expires)?,
        access_token: data.token,
        refresh_token: data.refresh_token,
    };

    tracing::info!(
        "Logged in as {} (token: {}..., expires: {}, refresh expires: {})",
        creds.email,
        token_prefix(&session.access_token),
        session.access_expires.to_rfc3339(),
        session.refresh_expires.to_rfc3339()
    );

    Ok(session)
}

/// Trade a refresh token for a new access token
pub async fn refresh(client: &Client, domain: &Url, refresh_token: &str) -> Result<AccessToken> {
    let url = endpoint_url(domain, REFRESH_PATH)?;
    tracing::debug!(url = %url, "Refreshing access token");

    let response = client
        .post(url)
        .header(AUTHORIZATION, format!("Bearer {}", refresh_token))
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(
            status = status.as_u16(),
            body = %error_text,
            "Token refresh rejected"
        );
        return Err(Error::Refresh {
            status: status.as_u16(),
        });
    }

    let data: RefreshResponse = response.json().await?;
    let token = AccessToken {
        expires: parse_expiry(&data.expires)?,
        token: data.token,
    };

    tracing::info!(
        "Access token refreshed (token: {}..., expires: {})",
        token_prefix(&token.token),
        token.expires.to_rfc3339()
    );

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_on_bare_domain() {
        let domain = Url::parse("https://api.pentadatainc.com").unwrap();
        assert_eq!(
            endpoint_url(&domain, LOGIN_PATH).unwrap().as_str(),
            "https://api.pentadatainc.com/subscribers/login"
        );
        assert_eq!(
            endpoint_url(&domain, REFRESH_PATH).unwrap().as_str(),
            "https://api.pentadatainc.com/subscribers/refresh"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_directory_prefix() {
        let domain = Url::parse("https://gateway.example.com/penta/").unwrap();
        assert_eq!(
            endpoint_url(&domain, LOGIN_PATH).unwrap().as_str(),
            "https://gateway.example.com/penta/subscribers/login"
        );

        // Without a trailing slash the last segment is replaced
        let domain = Url::parse("https://gateway.example.com/penta").unwrap();
        assert_eq!(
            endpoint_url(&domain, LOGIN_PATH).unwrap().as_str(),
            "https://gateway.example.com/subscribers/login"
        );
    }

    #[test]
    fn test_token_prefix() {
        assert_eq!(token_prefix("eyJhbGciOiJIUzI1NiJ9"), "eyJhbGci");
        assert_eq!(token_prefix("T1"), "T1");
        assert_eq!(token_prefix(""), "");
    }
}
