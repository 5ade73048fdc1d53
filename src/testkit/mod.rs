//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`] - [`ScriptedTransport`](transport::ScriptedTransport), an
//!   [`HttpTransport`](crate::port::HttpTransport) with queued or routed replies.
//! - [`document`] - Builders for canonical documents: invoices, notes,
//!   support documents and the batches that carry them.

pub mod document;
pub mod transport;
