//! Environment-driven settings for the API and browser suites.

use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a whole number of milliseconds, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Paths of the REST resources under the API base URL
pub mod endpoints {
    pub const TRANSACTIONS: &str = "/transactions";
    pub const ENVELOPES: &str = "/envelopes";
    pub const ACCOUNTS: &str = "/accounts";
}

/// Load a `.env` file from the working directory if one exists.
pub fn load_dotenv() {
    dotenv::dotenv().ok();
}

/// Settings for the REST API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: String,
    pub timeout: Duration,
    /// Declared for parity with the HTTP layer's settings; no caller retries.
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://goodbudget.com/api";
    const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_ms = match lookup("TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber { key: "TIMEOUT", value: raw })?,
            None => Self::DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            base_url: lookup("BASE_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            auth_token: lookup("AUTH_TOKEN").unwrap_or_default(),
            timeout: Duration::from_millis(timeout_ms),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1000),
        })
    }
}

/// Settings for the browser suites
#[derive(Debug, Clone)]
pub struct E2eConfig {
    pub site_url: String,
    pub valid_email: String,
    pub valid_password: String,
    pub webdriver_url: String,
    pub headless: bool,
}

impl E2eConfig {
    pub const DEFAULT_SITE_URL: &'static str = "https://www.goodbudget.com";
    const DEFAULT_EMAIL: &'static str = "existinguser@example.com";
    const DEFAULT_PASSWORD: &'static str = "defaultPassword123";
    const DEFAULT_WEBDRIVER_URL: &'static str = "http://localhost:4444";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).as_deref() == Some("true");

        Self {
            site_url: lookup("GOODBUDGET_SITE_URL")
                .unwrap_or_else(|| Self::DEFAULT_SITE_URL.to_string()),
            valid_email: lookup("GOODBUDGET_VALID_EMAIL")
                .unwrap_or_else(|| Self::DEFAULT_EMAIL.to_string()),
            valid_password: lookup("GOODBUDGET_VALID_PASSWORD")
                .unwrap_or_else(|| Self::DEFAULT_PASSWORD.to_string()),
            webdriver_url: lookup("WEBDRIVER_URL")
                .unwrap_or_else(|| Self::DEFAULT_WEBDRIVER_URL.to_string()),
            headless: flag("CI") || flag("DOCKER"),
        }
    }

    /// The name the dashboard shows for the configured account.
    pub fn valid_username(&self) -> &str {
        username_of(&self.valid_email)
    }
}

/// Local part of an email address, which the app displays as the user name.
pub fn username_of(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Bounded waits used by the page objects
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub click: Duration,
    pub url: Duration,
    pub assertion: Duration,
    pub envelope_list: Duration,
    pub welcome_modal: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            click: Duration::from_millis(5000),
            url: Duration::from_millis(10_000),
            assertion: Duration::from_millis(5000),
            envelope_list: Duration::from_millis(10_000),
            welcome_modal: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl Timeouts {
    /// Every wait shortened to `limit`, polling at a tenth of it.
    pub fn uniform(limit: Duration) -> Self {
        Self {
            click: limit,
            url: limit,
            assertion: limit,
            envelope_list: limit,
            welcome_modal: limit,
            poll_interval: limit / 10,
        }
    }
}
