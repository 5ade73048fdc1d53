//! Numrot upstream integration.
//!
//! Everything that knows the upstream's wire format lives here:
//!
//! - [`transport`]: reqwest implementation of [`HttpTransport`](crate::port::HttpTransport)
//! - [`token`] / [`auth`]: bearer token cache and acquisition
//! - [`transform`]: internal document to upstream payload
//! - [`reconcile`]: upstream reply to per-document outcomes
//! - [`query`] / [`radian`]: read-only lookups and lifecycle events

pub mod auth;
pub mod dto;
pub mod endpoint;
pub mod query;
pub mod radian;
pub mod reconcile;
pub mod token;
pub mod transform;
pub mod transport;

pub use auth::AuthManager;
pub use query::QueryClient;
pub use radian::{EventRequest, RadianClient};
pub use reconcile::{reconcile, Reconciled};
pub use token::TokenCache;
pub use transform::{TransformSettings, Transformer};
pub use transport::ReqwestTransport;
