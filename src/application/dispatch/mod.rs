//! Batch dispatch.
//!
//! The upstream accepts one document per call, so a batch is a fan-out: a
//! pool of workers pulls `(index, document)` pairs, every document passes the
//! rate limiter, the concurrency limiter and the circuit breaker, and the
//! results are re-sequenced into input order when the pool is drained.

pub mod engine;

pub use engine::{DispatchEngine, EngineStats};

/// Failure recorded when the breaker rejects a call.
pub const MSG_BREAKER_OPEN: &str =
    "Circuit breaker is open: upstream calls suspended until cooldown expires";
/// Failure recorded when a 200 reply yields no outcome for the document.
pub const MSG_EMPTY_RESPONSE: &str = "Response received but no processed or failed documents";
/// Failure recorded for documents still pending when the drain stops.
pub const MSG_INCOMPLETE: &str = "Document processing incomplete — no result received";
