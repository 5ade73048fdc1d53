//! Dispatch engine and flow-control configuration.

use std::time::Duration;

use serde::Deserialize;

/// Upper bound for the concurrency limiter.
pub const MAX_CONCURRENT_CEILING: usize = 1000;

/// Circuit breaker settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakerConfig {
    /// When false, calls are never gated.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Failure count that opens the breaker.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
    /// Failure ratio in (0, 1] that opens the breaker.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: f64,
    /// Calls observed before the failure ratio is evaluated; 0 evaluates it
    /// from the first failure.
    #[serde(default = "default_min_requests")]
    pub min_requests: u32,
    /// Seconds the breaker stays open before probing.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Consecutive half-open successes that close the breaker.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
}

const fn default_true() -> bool {
    true
}

const fn default_max_failures() -> u32 {
    10
}

fn default_failure_threshold() -> f64 {
    0.5
}

const fn default_min_requests() -> u32 {
    0
}

const fn default_cooldown_secs() -> u64 {
    30
}

const fn default_success_threshold() -> u32 {
    3
}

impl BreakerConfig {
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_failures: default_max_failures(),
            failure_threshold: default_failure_threshold(),
            min_requests: default_min_requests(),
            cooldown_secs: default_cooldown_secs(),
            success_threshold: default_success_threshold(),
        }
    }
}

/// Dispatch engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// In-flight upstream calls; 0 disables the limiter.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Documents accepted per batch; 0 means unbounded.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Upstream calls per second; 0 disables the rate limiter.
    #[serde(default = "default_rate_limit_rps")]
    pub rate_limit_rps: u32,
    /// Wall-clock cap for draining a batch.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
    /// Retries after a timed-out submission.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First retry delay; doubles on every further attempt.
    #[serde(default = "default_retry_initial_backoff_ms")]
    pub retry_initial_backoff_ms: u64,
    #[serde(default)]
    pub breaker: BreakerConfig,
}

const fn default_max_concurrent() -> usize {
    10
}

const fn default_batch_size() -> usize {
    500
}

const fn default_rate_limit_rps() -> u32 {
    10
}

const fn default_drain_timeout_secs() -> u64 {
    600
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_initial_backoff_ms() -> u64 {
    1000
}

impl DispatchConfig {
    /// Concurrency limit clamped to `1..=1000`, or `None` when disabled.
    #[must_use]
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrent > 0).then(|| self.max_concurrent.clamp(1, MAX_CONCURRENT_CEILING))
    }

    #[must_use]
    pub const fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    #[must_use]
    pub const fn retry_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_initial_backoff_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            batch_size: default_batch_size(),
            rate_limit_rps: default_rate_limit_rps(),
            drain_timeout_secs: default_drain_timeout_secs(),
            max_retries: default_max_retries(),
            retry_initial_backoff_ms: default_retry_initial_backoff_ms(),
            breaker: BreakerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_is_clamped() {
        let mut config = DispatchConfig {
            max_concurrent: 5000,
            ..Default::default()
        };
        assert_eq!(config.concurrency_limit(), Some(1000));
        config.max_concurrent = 0;
        assert_eq!(config.concurrency_limit(), None);
        config.max_concurrent = 7;
        assert_eq!(config.concurrency_limit(), Some(7));
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = DispatchConfig::default();
        assert_eq!(config.drain_timeout(), Duration::from_secs(600));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_initial_backoff(), Duration::from_secs(1));
        assert_eq!(config.breaker.success_threshold, 3);
        assert_eq!(config.breaker.min_requests, 0);
    }
}
