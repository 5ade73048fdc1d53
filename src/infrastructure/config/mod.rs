//! Infrastructure configuration modules.

pub mod dispatch;
pub mod issuer;
pub mod logging;
pub mod numrot;
pub mod settings;

pub use settings::Config;
