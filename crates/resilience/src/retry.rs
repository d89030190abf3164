//! Retry policy for transient failures of a single request.
//!
//! Polling never retries a failed attempt; request-level retries belong to
//! the transport underneath. [`RetryPolicy`] is the knob that transport uses:
//! a small number of extra attempts with exponential delays and symmetric
//! jitter.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};

/// Exponential retry with jitter.
///
/// Retry `n` (0-based) waits `interval * 2^n`, scaled by a random factor in
/// `[1 - jitter, 1 + jitter]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Extra attempts after the first one; zero disables retries
    pub limit: u32,
    /// Base delay before the first retry
    #[cfg_attr(feature = "humantime", serde(with = "humantime_serde"))]
    pub interval: Duration,
    /// Relative jitter in `[0.0, 1.0)`
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: 2,
            interval: Duration::from_secs(1),
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Maximum delay a single retry may wait, regardless of the attempt.
    pub const MAX_DELAY: Duration = Duration::from_secs(60);

    /// Policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            limit: 0,
            ..Self::default()
        }
    }

    /// Set the retry limit.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the base interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the relative jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Whether any retries will be attempted.
    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Validate field ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(ConfigError::validation(
                "jitter",
                format!("must be in [0.0, 1.0), got {}", self.jitter),
            ));
        }
        if self.is_enabled() && self.interval.is_zero() {
            return Err(ConfigError::validation(
                "interval",
                "must be greater than zero when retries are enabled",
            ));
        }
        Ok(())
    }

    /// Delay before retry `retry` (0-based), jitter not applied.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.min(16));
        self.interval.saturating_mul(factor).min(Self::MAX_DELAY)
    }

    /// Delay before retry `retry` (0-based), jitter applied.
    pub fn delay(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        if self.jitter <= 0.0 {
            return base;
        }
        let factor = 1.0 + self.jitter * (fastrand::f64() * 2.0 - 1.0);
        base.mul_f64(factor)
    }

    /// Run `operation`, retrying while `should_retry` says so and the limit
    /// allows.
    ///
    /// `should_retry` sees every outcome, so callers can retry on successful
    /// results too (e.g. a `503` response) and not only on errors. The last
    /// outcome is returned once the limit is reached.
    pub async fn execute<T, E, F, Fut, R>(
        &self,
        mut operation: F,
        mut should_retry: R,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: FnMut(&Result<T, E>) -> bool,
    {
        let mut retry = 0;
        loop {
            let outcome = operation().await;
            if !should_retry(&outcome) {
                return outcome;
            }
            if retry >= self.limit {
                if self.is_enabled() {
                    warn!(attempts = retry + 1, "retry limit reached");
                }
                return outcome;
            }

            let delay = self.delay(retry);
            retry += 1;
            debug!(
                retry,
                limit = self.limit,
                delay_ms = delay.as_millis() as u64,
                "retrying after delay"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
