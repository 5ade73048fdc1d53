//! Wire types for the upstream API.

pub mod request;
pub mod response;

pub use request::DocumentPayload;
pub use response::{Envelope, UpstreamDocument};
