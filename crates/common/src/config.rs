//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::Serialize;
use std::env;
use std::time::Duration;

const DEFAULT_SESSION_MAX_AGE_DAYS: u64 = 7;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Service name reported in logs
    pub app_name: String,

    /// Deployment environment (`development`, `production`, ...)
    pub environment: String,

    /// Listener configuration
    pub host: String,
    pub port: u16,

    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Upper bound for issued session cookies
    pub session_max_age: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_port(lookup("PORT").as_deref())?;

        let session_days = lookup("SESSION_MAX_AGE_DAYS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_SESSION_MAX_AGE_DAYS);

        Ok(Self {
            app_name: lookup("APP_NAME").unwrap_or_else(|| "gatehouse".to_string()),
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "debug".to_string()),
            session_max_age: Duration::from_secs(session_days * SECONDS_PER_DAY),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Session cookies carry `Secure` everywhere except local development.
    pub fn secure_cookies(&self) -> bool {
        !self.is_development()
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16> {
    let value = raw.unwrap_or("3000").trim();
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(anyhow::anyhow!("PORT must be a positive integer")),
    }
}
