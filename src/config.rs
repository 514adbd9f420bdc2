use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::models::UserId;

/// Runtime configuration for the listing detail view and its backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the market API, e.g. `http://localhost:3000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay before scrolling to a requested section, giving the host time to render it
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,
    /// Logged-in user, if any
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Login token for authorized calls
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_scroll_delay_ms() -> u64 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            scroll_delay_ms: default_scroll_delay_ms(),
            user_id: None,
            token: None,
        }
    }
}

impl Config {
    /// Defaults overridden by `MARKET_*` environment variables.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("MARKET_API_URL") {
            config.base_url = url;
        }
        if let Some(secs) = parse_var(&lookup, "MARKET_API_TIMEOUT_SECS") {
            config.timeout_secs = secs;
        }
        if let Some(ms) = parse_var(&lookup, "MARKET_SCROLL_DELAY_MS") {
            config.scroll_delay_ms = ms;
        }
        if let Some(user) = parse_var(&lookup, "MARKET_USER_ID") {
            config.user_id = Some(user);
        }
        if let Some(token) = lookup("MARKET_TOKEN").filter(|t| !t.is_empty()) {
            config.token = Some(token);
        }

        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    pub fn with_scroll_delay(mut self, millis: u64) -> Self {
        self.scroll_delay_ms = millis;
        self
    }

    /// Log in as `user_id` with `token`
    pub fn with_login(mut self, user_id: UserId, token: impl Into<String>) -> Self {
        self.user_id = Some(user_id);
        self.token = Some(token.into());
        self
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a number", key, raw);
            None
        }
    }
}
