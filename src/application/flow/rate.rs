//! Token-bucket rate limiter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::FlowError;

/// Token bucket refilled at a steady rate.
///
/// The bucket starts full with `rate` tokens. A background ticker adds one
/// token every `1s / rate` while the bucket is below capacity. Acquired
/// tokens are consumed, not returned.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Arc<Semaphore>,
    capacity: usize,
    closed: AtomicBool,
    shutdown: CancellationToken,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` calls per second (minimum 1).
    ///
    /// Spawns the refill ticker, so this must be called within a Tokio runtime.
    #[must_use]
    pub fn new(rate: u32) -> Self {
        let rate = rate.max(1);
        let capacity = rate as usize;
        let bucket = Arc::new(Semaphore::new(capacity));
        let shutdown = CancellationToken::new();

        let period = refill_period(rate);
        tokio::spawn(refill(Arc::clone(&bucket), capacity, period, shutdown.clone()));

        Self {
            bucket,
            capacity,
            closed: AtomicBool::new(false),
            shutdown,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens currently in the bucket.
    #[must_use]
    pub fn available(&self) -> usize {
        self.bucket.available_permits()
    }

    /// Take one token, waiting for a refill if the bucket is empty.
    ///
    /// # Errors
    ///
    /// [`FlowError::Cancelled`] if `cancel` fires first, [`FlowError::Closed`]
    /// once the limiter has been closed.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), FlowError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FlowError::Closed);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FlowError::Cancelled),
            () = self.shutdown.cancelled() => Err(FlowError::Closed),
            permit = self.bucket.acquire() => {
                permit.map_err(|_| FlowError::Closed)?.forget();
                Ok(())
            }
        }
    }

    /// Stop the refill ticker and wake pending waiters. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shutdown.cancel();
        self.bucket.close();
        debug!(capacity = self.capacity, "Rate limiter closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// One second split across `rate` tokens, never zero.
fn refill_period(rate: u32) -> Duration {
    (Duration::from_secs(1) / rate.max(1)).max(Duration::from_nanos(1))
}

async fn refill(bucket: Arc<Semaphore>, capacity: usize, period: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately; the bucket already starts full.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                if bucket.available_permits() < capacity {
                    bucket.add_permits(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn starts_full_and_drains() {
        let limiter = RateLimiter::new(3);
        let cancel = CancellationToken::new();
        assert_eq!(limiter.available(), 3);
        for _ in 0..3 {
            limiter.acquire(&cancel).await.unwrap();
        }
        assert_eq!(limiter.available(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refills_one_token_per_period_up_to_capacity() {
        let limiter = RateLimiter::new(2);
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel).await.unwrap();
        limiter.acquire(&cancel).await.unwrap();

        tokio::time::sleep(Duration::from_millis(510)).await;
        assert_eq!(limiter.available(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_bucket_wait_is_cancellable() {
        let limiter = RateLimiter::new(1);
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel).await.unwrap();

        let waiter = CancellationToken::new();
        waiter.cancel();
        assert_eq!(limiter.acquire(&waiter).await, Err(FlowError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn close_is_idempotent_and_rejects_acquire() {
        let limiter = RateLimiter::new(5);
        limiter.close();
        limiter.close();
        assert!(limiter.is_closed());
        let cancel = CancellationToken::new();
        assert_eq!(limiter.acquire(&cancel).await, Err(FlowError::Closed));
    }

    #[test]
    fn refill_period_is_never_zero() {
        assert_eq!(refill_period(4), Duration::from_millis(250));
        assert_eq!(refill_period(0), Duration::from_secs(1));
        assert_eq!(refill_period(u32::MAX), Duration::from_nanos(1));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_rate_is_treated_as_one() {
        let limiter = RateLimiter::new(0);
        assert_eq!(limiter.capacity(), 1);
    }
}
