//! Radian lifecycle events.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Longest generator name/identification the upstream accepts.
pub const MAX_GENERATOR_FIELD_LEN: usize = 100;

/// Lifecycle event registered against a received document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    /// Acuse de recibo de la factura.
    Acuse,
    /// Reclamo (rejection); requires a rejection code.
    Reclamo,
    /// Recibo del bien o prestación del servicio.
    #[serde(rename = "RECIBOBIEN")]
    ReciboBien,
    /// Aceptación expresa.
    Aceptacion,
}

impl EventKind {
    /// Radian code sent upstream.
    #[must_use]
    pub const fn radian_code(self) -> &'static str {
        match self {
            Self::Acuse => "030",
            Self::Reclamo => "031",
            Self::ReciboBien => "032",
            Self::Aceptacion => "033",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Acuse => "ACUSE",
            Self::Reclamo => "RECLAMO",
            Self::ReciboBien => "RECIBOBIEN",
            Self::Aceptacion => "ACEPTACION",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACUSE" => Ok(Self::Acuse),
            "RECLAMO" => Ok(Self::Reclamo),
            "RECIBOBIEN" => Ok(Self::ReciboBien),
            "ACEPTACION" => Ok(Self::Aceptacion),
            other => Err(DomainError::UnknownEventKind(other.to_string())),
        }
    }
}

/// Reason codes accepted with a RECLAMO.
const REJECTION_CODES: [&str; 4] = ["01", "02", "03", "04"];

/// Validated rejection code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionCode(String);

impl RejectionCode {
    /// Validate a rejection code.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidRejectionCode`] when the code is not one
    /// of `01`..`04`.
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let code = code.trim();
        if REJECTION_CODES.contains(&code) {
            Ok(Self(code.to_string()))
        } else {
            Err(DomainError::InvalidRejectionCode(code.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check that the rejection code is consistent with the event kind.
///
/// # Errors
///
/// RECLAMO without a code, a code outside `01`..`04`, or a code on any other
/// kind are all rejected.
pub fn validate_rejection(
    kind: EventKind,
    code: Option<&str>,
) -> Result<Option<RejectionCode>, DomainError> {
    let code = code.map(str::trim).filter(|c| !c.is_empty());
    match (kind, code) {
        (EventKind::Reclamo, None) => Err(DomainError::RejectionCodeRequired),
        (EventKind::Reclamo, Some(code)) => RejectionCode::new(code).map(Some),
        (_, Some(_)) => Err(DomainError::UnexpectedRejectionCode),
        (_, None) => Ok(None),
    }
}

/// Inclusive date range used by the Radian listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parse a `YYYY-MM-DD` pair.
    ///
    /// # Errors
    ///
    /// Fails on malformed dates or when `start > end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        let start_date = parse_date("start_date", start)?;
        let end_date = parse_date("end_date", end)?;
        if start_date > end_date {
            return Err(DomainError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            start: start_date,
            end: end_date,
        })
    }
}

/// Parse a `YYYY-MM-DD` date for `field`.
///
/// # Errors
///
/// Returns [`DomainError::InvalidDate`] for anything else.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| DomainError::InvalidDate {
        field,
        value: value.to_string(),
        expected: "YYYY-MM-DD",
    })
}

/// Require a non-blank value no longer than `max` characters.
///
/// # Errors
///
/// Returns [`DomainError::MissingField`] or [`DomainError::FieldTooLong`].
pub fn require_bounded(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField { field });
    }
    if value.chars().count() > max {
        return Err(DomainError::FieldTooLong { field, max });
    }
    Ok(())
}

/// Minimal structural e-mail check (`local@domain.tld`).
///
/// # Errors
///
/// Returns [`DomainError::InvalidEmail`] when the address is malformed.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let email = email.trim();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.contains('.')
            && !email.contains(char::is_whitespace)
    });
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidEmail(email.to_string()))
    }
}
