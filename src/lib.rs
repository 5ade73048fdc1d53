//! Numrot gateway - upstream dispatch for Colombian electronic invoicing.
//!
//! Takes batches of canonical documents (invoices, credit and debit notes,
//! support documents), turns each one into the Numrot provider's JSON
//! payload and submits it, one call per document, under shared flow control.
//! Every batch reply lists exactly one outcome per input document, in input
//! order.
//!
//! # Architecture
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - **`domain`** - Document model, NIT parsing, outcomes, Radian events
//! - **`port`** - `HttpTransport` and `CustomerDirectory` traits
//! - **`adapter::outbound::numrot`** - reqwest transport, token cache and
//!   auth, payload transformer, response reconciler, queries, Radian
//! - **`application::flow`** - rate limiter, concurrency limiter, circuit breaker
//! - **`application::dispatch`** - `DispatchEngine`, the batch fan-out
//! - **`infrastructure`** - configuration, logging, wiring
//!
//! # Modules
//!
//! - [`adapter`] - Numrot and in-memory adapters, command line
//! - [`application`] - Flow control and dispatch
//! - [`domain`] - Document model, outcomes and validation
//! - [`error`] - Error types for the crate
//! - [`infrastructure`] - Configuration and composition root
//! - [`port`] - Trait seams
//!
//! # Example
//!
//! ```no_run
//! use numrot_gateway::infrastructure::bootstrap::Gateway;
//! use numrot_gateway::infrastructure::config::Config;
//! use numrot_gateway::domain::DocumentBatch;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(batch: DocumentBatch) -> numrot_gateway::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let gateway = Gateway::from_config(&config, None);
//! let reply = gateway
//!     .engine
//!     .register_document(batch, &CancellationToken::new())
//!     .await?;
//! println!("{}", reply.message);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
