use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, Password};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde_json::Value;
use std::io::IsTerminal;

use crate::auth::DEFAULT_DOMAIN;
use crate::http_client::RequestOptions;

/// Penta - authenticated requests against the Pentadata Subscribers API
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// HTTP method (GET, POST, PUT, DELETE)
    pub method: String,

    /// Request URL, absolute or relative to the domain
    pub url: String,

    /// Verified subscriber email
    #[arg(short, long, env = "PENTA_EMAIL")]
    pub email: Option<String>,

    /// Subscriber API key
    #[arg(short = 'k', long, env = "PENTA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API domain used for login, refresh and relative URLs
    #[arg(long, env = "PENTA_DOMAIN", default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Extra request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Query parameter, "key=value" (repeatable)
    #[arg(short, long)]
    pub query: Vec<String>,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "300")]
    pub timeout: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub email: String,
    pub api_key: String,

    // API
    pub domain: String,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Logging
    pub log_level: String,

    // The request to issue
    pub method: Method,
    pub url: String,
    pub options: RequestOptions,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    /// Missing credentials are prompted for when running in a terminal.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut args = CliArgs::parse();

        if needs_interactive_setup(&args) {
            run_interactive_setup(&mut args)?;
        }

        Self::from_args(args)
    }

    /// Build configuration from parsed arguments without prompting
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let email = args
            .email
            .context("PENTA_EMAIL is required (use -e or set PENTA_EMAIL env var)")?;
        let api_key = args
            .api_key
            .context("PENTA_API_KEY is required (use -k or set PENTA_API_KEY env var)")?;

        let mut options = RequestOptions::new();
        for raw in &args.headers {
            let (name, value) = parse_header(raw)?;
            options = options.header(name, value);
        }
        for raw in &args.query {
            let (key, value) = parse_query(raw)?;
            options = options.query(key, value);
        }
        if let Some(ref data) = args.data {
            let body: Value =
                serde_json::from_str(data).context("Request body (-d) is not valid JSON")?;
            options = options.json(body);
        }

        Ok(Config {
            email,
            api_key,
            domain: args.domain,
            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            http_request_timeout: args.timeout,
            log_level: args.log_level,
            method: parse_method(&args.method)?,
            url: args.url,
            options,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            anyhow::bail!("PENTA_EMAIL cannot be empty");
        }
        if self.api_key.is_empty() {
            anyhow::bail!("PENTA_API_KEY cannot be empty");
        }

        let domain = Url::parse(&self.domain)
            .with_context(|| format!("PENTA_DOMAIN is not a valid URL: {}", self.domain))?;
        if !matches!(domain.scheme(), "http" | "https") || domain.host_str().is_none() {
            anyhow::bail!("PENTA_DOMAIN must be an http(s) URL: {}", self.domain);
        }

        Ok(())
    }
}

/// Parse an HTTP method, limited to the four supported verbs
fn parse_method(s: &str) -> Result<Method> {
    match s.to_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        other => anyhow::bail!("Unsupported method: {} (expected GET, POST, PUT or DELETE)", other),
    }
}

/// Parse a "Name: value" header argument
fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header must be \"Name: value\": {}", raw))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("Invalid header name: {}", name.trim()))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("Invalid value for header {}", name))?;
    Ok((name, value))
}

/// Parse a "key=value" query argument
fn parse_query(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Query parameter must be \"key=value\": {}", raw))?;
    if key.is_empty() {
        anyhow::bail!("Query parameter has an empty key: {}", raw);
    }
    Ok((key.to_string(), value.to_string()))
}

// === Interactive Setup ===

/// Prompt only when a credential is missing and someone is at the terminal
pub fn needs_interactive_setup(args: &CliArgs) -> bool {
    (args.email.is_none() || args.api_key.is_none()) && std::io::stdin().is_terminal()
}

/// Ask for the missing credentials
fn run_interactive_setup(args: &mut CliArgs) -> Result<()> {
    if args.email.is_none() {
        let email: String = Input::new()
            .with_prompt("Subscriber email (PENTA_EMAIL)")
            .interact_text()
            .context("Failed to read PENTA_EMAIL")?;
        args.email = Some(email);
    }

    if args.api_key.is_none() {
        let api_key = Password::new()
            .with_prompt("API key (PENTA_API_KEY)")
            .interact()
            .context("Failed to read PENTA_API_KEY")?;
        args.api_key = Some(api_key);
    }

    Ok(())
}
