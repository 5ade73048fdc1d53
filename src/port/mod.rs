//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!          dispatch engine, transformer
//!                      │
//!          ┌───────────┴────────────┐
//!          ▼                        ▼
//!   HttpTransport           CustomerDirectory
//!   (reqwest, scripted)     (in-memory)
//! ```

pub mod outbound;

pub use outbound::customer::{CustomerDirectory, CustomerRecord};
pub use outbound::transport::{HttpMethod, HttpReply, HttpRequest, HttpTransport, TransportError};
