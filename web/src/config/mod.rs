//! Central module for application-wide configuration settings.
//!
//! This module handles loading the backend location, session signing secret,
//! server port and the timing knobs used by the search debouncer and the
//! payment verification page.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_timeout_seconds: u64,
    pub jwt_secret: String,
    pub public_base_url: String,
    pub cookie_secure: bool,
    pub search_debounce_ms: u64,
    pub payment_refresh_seconds: u64,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let backend_url = env::var("BACKEND_URL")
            .context("BACKEND_URL not set")?
            .trim_end_matches('/')
            .to_string();

        let backend_timeout_seconds = env::var("BACKEND_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<u64>()
            .context("BACKEND_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let cookie_secure = env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .context("COOKIE_SECURE must be true or false")?;

        let search_debounce_ms = env::var("SEARCH_DEBOUNCE_MS")
            .unwrap_or_else(|_| "400".to_string())
            .parse::<u64>()
            .context("SEARCH_DEBOUNCE_MS must be a valid number")?;

        let payment_refresh_seconds = env::var("PAYMENT_REFRESH_SECONDS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u64>()
            .context("PAYMENT_REFRESH_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        Ok(Config {
            backend_url,
            backend_timeout_seconds,
            jwt_secret,
            public_base_url,
            cookie_secure,
            search_debounce_ms,
            payment_refresh_seconds,
            server_port,
        })
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// URL the payment gateway sends the browser back to.
    pub fn payment_callback_url(&self) -> String {
        format!("{}/payments/verify", self.public_base_url)
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by router-level tests; never touches the environment.
    pub fn for_tests() -> Self {
        Config {
            backend_url: "http://backend.invalid".to_string(),
            backend_timeout_seconds: 1,
            jwt_secret: "test-secret".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            cookie_secure: false,
            search_debounce_ms: 400,
            payment_refresh_seconds: 5,
            server_port: 3000,
        }
    }
}
