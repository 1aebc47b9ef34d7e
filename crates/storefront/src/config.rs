//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `CAMPUS_MARKET_DATA_DIR` - Directory for persisted collections (default: .campus-market)
//! - `CAMPUS_MARKET_LATENCY_MIN_MS` - Shortest simulated API delay (default: 600)
//! - `CAMPUS_MARKET_LATENCY_MAX_MS` - Longest simulated API delay (default: 1500)
//! - `CAMPUS_MARKET_ORDER_NOTIFY_DELAY_MS` - Delay before a seller hears about a new order (default: 500)
//! - `CAMPUS_MARKET_MESSAGE_NOTIFY_DELAY_MS` - Delay before a receiver hears about a message (default: 1000)
//! - `CAMPUS_MARKET_SHIPPING_ESTIMATE` - Flat shipping shown in the cart summary, in naira (default: 500)
//! - `CAMPUS_MARKET_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use campus_market_core::Naira;

const DEFAULT_DATA_DIR: &str = ".campus-market";
const DEFAULT_LATENCY_MIN_MS: u64 = 600;
const DEFAULT_LATENCY_MAX_MS: u64 = 1500;
const DEFAULT_ORDER_NOTIFY_DELAY_MS: u64 = 500;
const DEFAULT_MESSAGE_NOTIFY_DELAY_MS: u64 = 1000;
const DEFAULT_SHIPPING_ESTIMATE: i64 = 500;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace configuration.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Root directory for file persistence
    pub data_dir: PathBuf,
    /// Simulated API latency range
    pub latency: LatencyConfig,
    /// Notification delays
    pub notifications: NotificationConfig,
    /// Flat shipping estimate shown at checkout
    pub shipping_estimate: Naira,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Simulated API latency bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyConfig {
    pub min: Duration,
    pub max: Duration,
}

/// Delays between a mutation and the notification it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationConfig {
    /// New order -> seller
    pub order_delay: Duration,
    /// New message -> receiver
    pub message_delay: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            latency: LatencyConfig::default(),
            notifications: NotificationConfig::default(),
            shipping_estimate: Naira::new(DEFAULT_SHIPPING_ESTIMATE),
            log_json: false,
            sentry_dsn: None,
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(DEFAULT_LATENCY_MIN_MS),
            max: Duration::from_millis(DEFAULT_LATENCY_MAX_MS),
        }
    }
}

impl LatencyConfig {
    /// No simulated delay at all.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            order_delay: Duration::from_millis(DEFAULT_ORDER_NOTIFY_DELAY_MS),
            message_delay: Duration::from_millis(DEFAULT_MESSAGE_NOTIFY_DELAY_MS),
        }
    }
}

impl MarketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed, or if
    /// the latency range is inverted.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("CAMPUS_MARKET_DATA_DIR", DEFAULT_DATA_DIR));

        let latency = LatencyConfig {
            min: get_millis("CAMPUS_MARKET_LATENCY_MIN_MS", DEFAULT_LATENCY_MIN_MS)?,
            max: get_millis("CAMPUS_MARKET_LATENCY_MAX_MS", DEFAULT_LATENCY_MAX_MS)?,
        };
        validate_latency(latency)?;

        let notifications = NotificationConfig {
            order_delay: get_millis(
                "CAMPUS_MARKET_ORDER_NOTIFY_DELAY_MS",
                DEFAULT_ORDER_NOTIFY_DELAY_MS,
            )?,
            message_delay: get_millis(
                "CAMPUS_MARKET_MESSAGE_NOTIFY_DELAY_MS",
                DEFAULT_MESSAGE_NOTIFY_DELAY_MS,
            )?,
        };

        let shipping_estimate = match get_optional_env("CAMPUS_MARKET_SHIPPING_ESTIMATE") {
            Some(raw) => parse_naira("CAMPUS_MARKET_SHIPPING_ESTIMATE", &raw)?,
            None => Naira::new(DEFAULT_SHIPPING_ESTIMATE),
        };

        let log_json = get_optional_env("CAMPUS_MARKET_LOG_JSON").is_some_and(|v| parse_flag(&v));
        let sentry_dsn = get_optional_env("SENTRY_DSN").filter(|dsn| !dsn.is_empty());

        Ok(Self {
            data_dir,
            latency,
            notifications,
            shipping_estimate,
            log_json,
            sentry_dsn,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a millisecond duration, falling back to `default`.
fn get_millis(key: &str, default: u64) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(Duration::from_millis(default)), |raw| {
        parse_millis(key, &raw)
    })
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_naira(key: &str, raw: &str) -> Result<Naira, ConfigError> {
    Naira::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn validate_latency(latency: LatencyConfig) -> Result<(), ConfigError> {
    if latency.min > latency.max {
        return Err(ConfigError::InvalidEnvVar(
            "CAMPUS_MARKET_LATENCY_MIN_MS".to_string(),
            format!(
                "must not exceed CAMPUS_MARKET_LATENCY_MAX_MS ({}ms > {}ms)",
                latency.min.as_millis(),
                latency.max.as_millis()
            ),
        ));
    }
    Ok(())
}
