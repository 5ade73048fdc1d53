//! Domain validation errors.
//!
//! Raised by constructors that check caller input before anything is sent
//! upstream. These map to a 4xx reply at the caller boundary.

use thiserror::Error;

/// Errors raised when caller input violates a domain rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was blank.
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the blank field.
        field: &'static str,
    },

    /// A date did not match the expected layout.
    #[error("invalid date for {field}: '{value}' (expected {expected})")]
    InvalidDate {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A date range ends before it starts.
    #[error("date range is inverted: {start} > {end}")]
    InvertedRange { start: String, end: String },

    /// Unknown lifecycle event name.
    #[error("unknown event kind '{0}' (expected ACUSE, RECLAMO, RECIBOBIEN or ACEPTACION)")]
    UnknownEventKind(String),

    /// RECLAMO events must carry a rejection code.
    #[error("rejection code is required for RECLAMO events")]
    RejectionCodeRequired,

    /// Rejection code outside the allowed set.
    #[error("invalid rejection code '{0}' (expected 01, 02, 03 or 04)")]
    InvalidRejectionCode(String),

    /// Rejection code supplied for an event that does not take one.
    #[error("rejection code is only allowed for RECLAMO events")]
    UnexpectedRejectionCode,

    /// Field longer than the upstream accepts.
    #[error("{field} exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    /// Malformed e-mail address.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}
