//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::constants::{
    DEFAULT_CLEANUP_INTERVAL_MS, DEFAULT_WELCOME_GIFT_DELAY_MS, DEFAULT_WS_CONNECT_DELAY_MS,
};

/// How new user identifiers are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserIdStrategy {
    /// Always hand out the same placeholder id
    Static,
    /// Random UUID v4 per user
    #[default]
    Uuid,
}

impl FromStr for UserIdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(UserIdStrategy::Static),
            "uuid" => Ok(UserIdStrategy::Uuid),
            other => Err(format!("unknown user id strategy '{}'", other)),
        }
    }
}

/// Application configuration.
///
/// The bind address is a `serve` argument (see `cli::args`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Simulated duration of sending a welcome gift
    pub welcome_gift_delay: Duration,
    /// Delay between user creation and its socket connection
    pub ws_connect_delay: Duration,
    /// Period of the expired-user cleanup job
    pub cleanup_interval: Duration,
    pub user_id_strategy: UserIdStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            welcome_gift_delay: Duration::from_millis(DEFAULT_WELCOME_GIFT_DELAY_MS),
            ws_connect_delay: Duration::from_millis(DEFAULT_WS_CONNECT_DELAY_MS),
            cleanup_interval: Duration::from_millis(DEFAULT_CLEANUP_INTERVAL_MS),
            user_id_strategy: UserIdStrategy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// Missing or malformed values fall back to the defaults in `constants`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            welcome_gift_delay: parse_var::<u64>("WELCOME_GIFT_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.welcome_gift_delay),
            ws_connect_delay: parse_var::<u64>("WS_CONNECT_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.ws_connect_delay),
            cleanup_interval: parse_var::<u64>("CLEANUP_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.cleanup_interval),
            user_id_strategy: parse_var("USER_ID_STRATEGY")
                .unwrap_or(defaults.user_id_strategy),
        }
    }
}

/// Read and parse an environment variable, warning when it is malformed.
fn parse_var<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring malformed setting");
            None
        }
    }
}
