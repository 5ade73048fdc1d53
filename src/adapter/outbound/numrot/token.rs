//! Single-slot bearer token cache.

use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Holds at most one token together with its expiry.
///
/// Expiry is detected lazily on read; nothing runs in the background.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token if it is non-empty and not yet expired.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        let slot = self.slot.read();
        slot.as_ref()
            .filter(|t| !t.value.is_empty() && Instant::now() < t.expires_at)
            .map(|t| t.value.clone())
    }

    pub fn set(&self, token: impl Into<String>, ttl: Duration) {
        *self.slot.write() = Some(CachedToken {
            value: token.into(),
            expires_at: expiry(Instant::now(), ttl),
        });
    }

    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    /// True when no usable token is cached.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.get().is_none()
    }
}

/// `now + ttl`, capped far in the future instead of overflowing.
fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Roughly thirty years.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 3600);
