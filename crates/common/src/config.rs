//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_JWT_TTL_MINUTES: i64 = 60;
/// Thirty days
const MAX_JWT_TTL_MINUTES: i64 = 30 * 24 * 60;
const DEFAULT_THREAD_TIMEOUT_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL; in-memory stores are used when absent
    pub database_url: Option<String>,

    /// Token signing
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_ttl_minutes: i64,

    /// Idle minutes after which a conversation thread is closed
    pub thread_timeout_minutes: i64,

    /// Language model backend (`openai` or `mock`)
    pub llm_provider: String,
    /// Client identifier used to pick model credentials
    pub client_name: String,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET is required"))?;

        let thread_timeout_minutes =
            parse_or(&lookup, "THREAD_TIMEOUT_MINUTES", DEFAULT_THREAD_TIMEOUT_MINUTES)?;
        if thread_timeout_minutes <= 0 {
            anyhow::bail!("THREAD_TIMEOUT_MINUTES must be positive");
        }

        let jwt_ttl_minutes = parse_or(&lookup, "JWT_TTL_MINUTES", DEFAULT_JWT_TTL_MINUTES)?;
        if !(1..=MAX_JWT_TTL_MINUTES).contains(&jwt_ttl_minutes) {
            anyhow::bail!(
                "JWT_TTL_MINUTES must be between 1 and {}, got {}",
                MAX_JWT_TTL_MINUTES,
                jwt_ttl_minutes
            );
        }

        let config = Self {
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),

            jwt_secret,
            jwt_issuer: lookup("JWT_ISSUER"),
            jwt_ttl_minutes,

            thread_timeout_minutes,

            llm_provider: lookup("LLM_PROVIDER").unwrap_or_else(|| "mock".to_string()),
            client_name: lookup("CLIENT_NAME").unwrap_or_else(|| "default".to_string()),

            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "chatai=debug".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a number, got {:?}", key, raw)),
        None => Ok(default),
    }
}
