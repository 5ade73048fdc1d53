//! Flow control for upstream calls.
//!
//! Three independent gates sit in front of every submission:
//!
//! - [`RateLimiter`] - token bucket, calls per second
//! - [`ConcurrencyLimiter`] - counting semaphore, calls in flight
//! - [`CircuitBreaker`] - stops calling an upstream that keeps failing
//!
//! Waiting on the first two is cancellable through a
//! [`CancellationToken`](tokio_util::sync::CancellationToken).

pub mod breaker;
pub mod concurrency;
pub mod rate;

use thiserror::Error;

pub use breaker::{BreakerSettings, BreakerState, BreakerStats, CallError, CircuitBreaker};
pub use concurrency::{ConcurrencyLimiter, ConcurrencyPermit, LimiterStats};
pub use rate::RateLimiter;

/// Failure to obtain a rate or concurrency token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    #[error("wait cancelled")]
    Cancelled,

    #[error("limiter closed")]
    Closed,
}
