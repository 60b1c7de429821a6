// Outgoing request assembly
// Caller options, URL resolution and bearer header injection

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;

use crate::error::{Error, Result};

/// Per-request options supplied by the caller
///
/// Everything here is forwarded as-is, except that `Authorization` and
/// `Content-type` are always overwritten before sending.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }
}

/// Resolve a request URL against the API domain
/// Relative paths are joined onto the domain; absolute URLs pass through.
pub fn resolve_url(domain: &Url, url: &str) -> Result<Url> {
    domain
        .join(url)
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
}

/// Merge caller headers with the bearer token and JSON content type
pub fn authorized_headers(mut headers: HeaderMap, access_token: &str) -> Result<HeaderMap> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))?;
    bearer.set_sensitive(true);

    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Build the outgoing request for an already-authenticated call
pub fn build_request(
    client: &Client,
    method: Method,
    url: Url,
    options: RequestOptions,
    access_token: &str,
) -> Result<RequestBuilder> {
    let headers = authorized_headers(options.headers, access_token)?;

    let mut builder = client.request(method, url).headers(headers);
    if !options.query.is_empty() {
        builder = builder.query(&options.query);
    }
    if let Some(ref body) = options.json {
        builder = builder.json(body);
    }

    Ok(builder)
}
