//! Connection configuration.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use strato_resilience::RetryPolicy;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("strato/", env!("CARGO_PKG_VERSION"));

/// Serializable settings for a [`Connection`](crate::Connection).
///
/// Every field has a default, so a partial TOML table or an empty
/// environment deserializes cleanly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Base URL of the service, e.g. `https://api.example.com`
    pub url: Option<String>,
    /// Bearer token
    pub token: Option<SecretString>,
    pub user_agent: Option<String>,
    /// Total time allowed for a single round trip
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Request-level retries of the default transport
    pub retry: RetryPolicy,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            user_agent: None,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}
