use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// When unset, generation jobs are queued in-process.
    pub redis_url: Option<String>,
    pub gemini_api_key: String,
    /// Bearer token required by the staff review endpoints.
    pub admin_token: String,
    pub port: u16,
    pub rust_log: String,
    pub generation_timeout: Duration,
    /// `generating` claims older than this are handed back to the queue at startup.
    pub stale_claim_after: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            admin_token: require_env("ADMIN_TOKEN")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            generation_timeout: Duration::from_secs(secs_env("GENERATION_TIMEOUT_SECS", 60)?),
            stale_claim_after: Duration::from_secs(secs_env("STALE_CLAIM_SECS", 600)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn secs_env(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds")),
        Err(_) => Ok(default),
    }
}
