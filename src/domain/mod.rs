//! Gateway domain types.
//!
//! Nothing in here performs I/O. The internal document model, its money
//! helpers, per-document outcomes and the Radian event vocabulary are shared
//! by the transformer, the reconciler and the dispatch engine.

pub mod document;
pub mod error;
pub mod event;
pub mod money;
pub mod nit;
pub mod outcome;

pub use document::{Document, DocumentBatch, DocumentKind};
pub use nit::Nit;
pub use outcome::{BatchResponse, DocumentOutcome, FailedDocument, ProcessedDocument};
