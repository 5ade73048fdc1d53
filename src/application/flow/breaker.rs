//! Three-state circuit breaker.
//!
//! ```text
//!            failures >= max  or  ratio >= threshold
//!   Closed ─────────────────────────────────────────▶ Open
//!     ▲                                                 │
//!     │ successes >= success_threshold                  │ cooldown elapsed
//!     │                                                 ▼
//!     └──────────────────────────────────────────── HalfOpen
//!                       (any failure re-opens)
//! ```

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::infrastructure::config::dispatch::BreakerConfig;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Thresholds driving state transitions.
#[derive(Debug, Clone, Copy)]
pub struct BreakerSettings {
    pub max_failures: u32,
    pub failure_threshold: f64,
    pub min_requests: u32,
    pub cooldown: Duration,
    pub success_threshold: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self::from(&BreakerConfig::default())
    }
}

impl From<&BreakerConfig> for BreakerSettings {
    fn from(config: &BreakerConfig) -> Self {
        Self {
            max_failures: config.max_failures.max(1),
            failure_threshold: config.failure_threshold,
            min_requests: config.min_requests,
            cooldown: config.cooldown(),
            success_threshold: config.success_threshold.max(1),
        }
    }
}

/// Result of a gated call.
#[derive(Error, Debug)]
pub enum CallError<E> {
    /// Rejected without calling; the breaker is open.
    #[error("circuit breaker is open")]
    Open,

    #[error("{0}")]
    Inner(E),
}

impl<E> CallError<E> {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Snapshot of breaker counters.
#[derive(Debug, Clone, Copy)]
pub struct BreakerStats {
    pub state: BreakerState,
    pub failure_count: u32,
    pub success_count: u32,
    pub total_requests: u32,
    pub last_state_change: Instant,
    pub last_failure: Option<Instant>,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failure_count: u32,
    success_count: u32,
    total_requests: u32,
    last_state_change: Instant,
    last_failure: Option<Instant>,
}

impl Inner {
    fn transition(&mut self, to: BreakerState) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        self.last_state_change = Instant::now();
        match to {
            BreakerState::Open => warn!(
                %from,
                %to,
                failures = self.failure_count,
                total = self.total_requests,
                "Circuit breaker opened"
            ),
            _ => info!(%from, %to, "Circuit breaker state changed"),
        }
    }

    fn reset_counters(&mut self) {
        self.failure_count = 0;
        self.success_count = 0;
        self.total_requests = 0;
    }
}

/// Circuit breaker guarding an upstream.
#[derive(Debug)]
pub struct CircuitBreaker {
    settings: BreakerSettings,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(settings: BreakerSettings) -> Self {
        Self {
            settings,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failure_count: 0,
                success_count: 0,
                total_requests: 0,
                last_state_change: Instant::now(),
                last_failure: None,
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    #[must_use]
    pub fn stats(&self) -> BreakerStats {
        let inner = self.inner.lock();
        BreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            total_requests: inner.total_requests,
            last_state_change: inner.last_state_change,
            last_failure: inner.last_failure,
        }
    }

    /// Run `call` unless the breaker is open.
    ///
    /// An open breaker whose cooldown has elapsed moves to half-open and lets
    /// the call through as a probe.
    ///
    /// # Errors
    ///
    /// [`CallError::Open`] when rejected, [`CallError::Inner`] when `call`
    /// itself fails.
    pub async fn execute<T, E, F, Fut>(&self, call: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.admit()?;
        match call().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(err) => {
                self.on_failure();
                Err(CallError::Inner(err))
            }
        }
    }

    fn admit<E>(&self) -> Result<(), CallError<E>> {
        let mut inner = self.inner.lock();
        if inner.state == BreakerState::Open {
            if inner.last_state_change.elapsed() < self.settings.cooldown {
                return Err(CallError::Open);
            }
            inner.transition(BreakerState::HalfOpen);
            inner.success_count = 0;
        }
        inner.total_requests = inner.total_requests.saturating_add(1);
        Ok(())
    }

    fn on_failure(&self) {
        let mut inner = self.inner.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure = Some(Instant::now());

        match inner.state {
            BreakerState::HalfOpen => inner.transition(BreakerState::Open),
            BreakerState::Closed => {
                let by_count = inner.failure_count >= self.settings.max_failures;
                let by_ratio = inner.total_requests >= self.settings.min_requests
                    && inner.total_requests > 0
                    && f64::from(inner.failure_count) / f64::from(inner.total_requests)
                        >= self.settings.failure_threshold;
                if by_count || by_ratio {
                    inner.transition(BreakerState::Open);
                }
            }
            BreakerState::Open => {}
        }
    }

    fn on_success(&self) {
        let mut inner = self.inner.lock();
        inner.success_count = inner.success_count.saturating_add(1);

        match inner.state {
            BreakerState::HalfOpen => {
                if inner.success_count >= self.settings.success_threshold {
                    inner.reset_counters();
                    inner.transition(BreakerState::Closed);
                }
            }
            BreakerState::Closed => {
                if inner.success_count > inner.failure_count {
                    inner.failure_count = 0;
                }
            }
            BreakerState::Open => {}
        }
    }
}
