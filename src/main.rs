use anyhow::{Context, Result};

use penta_client::auth::{Credentials, TokenManager};
use penta_client::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = Config::load()?;
    config.validate()?;

    // Logs go to stderr so stdout carries only the response body
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    let credentials = Credentials::new(config.email.clone(), config.api_key.clone());
    let manager = match TokenManager::new(
        credentials,
        &config.domain,
        config.http_connect_timeout,
        config.http_request_timeout,
    )
    .await
    {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!("❌ Authentication failed: {}", e);
            tracing::error!("Check PENTA_EMAIL and PENTA_API_KEY for {}", config.domain);
            return Err(e).context("Unable to log in to the Pentadata API");
        }
    };
    tracing::info!("✅ Authenticated as {}", manager.email());

    let response = manager
        .request(config.method.clone(), &config.url, config.options.clone())
        .await
        .with_context(|| format!("{} {} failed", config.method, config.url))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    eprintln!("{} {} -> {}", config.method, config.url, status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", body),
    }

    if !status.is_success() {
        anyhow::bail!("Request returned {}", status);
    }

    Ok(())
}
