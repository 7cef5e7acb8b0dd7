//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use std::env;
use std::time::Duration;

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Supabase project URL (e.g. https://xyz.supabase.co)
    pub supabase_url: String,
    /// Supabase anon (public) API key
    pub supabase_anon_key: String,
    /// Public URL of this site, used for magic-link redirects and CORS
    pub site_url: String,
    /// Server port
    pub port: u16,
    /// Upper bound on any single call to Supabase
    pub request_timeout: Duration,
    /// How long an unused page state is kept before it is dropped
    pub page_idle_timeout: Duration,

    // --- Secrets ---
    /// JWT secret used by Supabase to sign access tokens (HS256)
    pub supabase_jwt_secret: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let supabase_url = env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?
            .trim()
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs =
            positive_secs("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let page_idle_timeout_secs =
            positive_secs("PAGE_IDLE_TIMEOUT_SECS", DEFAULT_PAGE_IDLE_TIMEOUT_SECS)?;

        Ok(Self {
            supabase_url,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            site_url: env::var("SITE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_SITE_URL.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            request_timeout: Duration::from_secs(request_timeout_secs),
            page_idle_timeout: Duration::from_secs(page_idle_timeout_secs),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .map_err(|_| ConfigError::Missing("SUPABASE_JWT_SECRET"))?
                .trim()
                .as_bytes()
                .to_vec(),
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test_anon_key".to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(2),
            page_idle_timeout: Duration::from_secs(DEFAULT_PAGE_IDLE_TIMEOUT_SECS),
            supabase_jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
        }
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !(self.site_url.starts_with("http://localhost")
            || self.site_url.starts_with("http://127.0.0.1"))
    }
}

/// Read a whole number of seconds greater than zero, or `default` if unset.
fn positive_secs(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::Invalid(var, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
