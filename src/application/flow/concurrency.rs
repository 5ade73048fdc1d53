//! Counting semaphore bounding in-flight upstream calls.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use super::FlowError;
use crate::infrastructure::config::dispatch::MAX_CONCURRENT_CEILING;

#[derive(Debug, Default)]
struct Counters {
    active: usize,
    total_acquired: u64,
    peak_active: usize,
}

/// Snapshot of limiter usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimiterStats {
    pub capacity: usize,
    pub active: usize,
    pub total_acquired: u64,
    pub peak_active: usize,
}

/// Bounded counting semaphore.
///
/// Slots are handed out as [`ConcurrencyPermit`] guards; dropping the guard
/// returns the slot, so a panicking holder cannot leak one.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    counters: Arc<Mutex<Counters>>,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `max_concurrent` slots, clamped to `1..=1000`.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        let capacity = max_concurrent.clamp(1, MAX_CONCURRENT_CEILING);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            counters: Arc::new(Mutex::new(Counters::default())),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait for a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Cancelled`] if `cancel` fires first. A cancelled
    /// wait never holds a slot.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<ConcurrencyPermit, FlowError> {
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FlowError::Cancelled),
            permit = Arc::clone(&self.semaphore).acquire_owned() => {
                permit.map_err(|_| FlowError::Closed)?
            }
        };

        {
            let mut counters = self.counters.lock();
            counters.active += 1;
            counters.total_acquired += 1;
            counters.peak_active = counters.peak_active.max(counters.active);
        }

        Ok(ConcurrencyPermit {
            counters: Arc::clone(&self.counters),
            _permit: permit,
        })
    }

    #[must_use]
    pub fn stats(&self) -> LimiterStats {
        let counters = self.counters.lock();
        LimiterStats {
            capacity: self.capacity,
            active: counters.active,
            total_acquired: counters.total_acquired,
            peak_active: counters.peak_active,
        }
    }
}

/// A held slot; released on drop.
#[derive(Debug)]
pub struct ConcurrencyPermit {
    counters: Arc<Mutex<Counters>>,
    // Declared last so the counter drops before the slot is handed back.
    _permit: OwnedSemaphorePermit,
}

impl Drop for ConcurrencyPermit {
    fn drop(&mut self) {
        let mut counters = self.counters.lock();
        counters.active = counters.active.saturating_sub(1);
    }
}
