//! Reply shapes returned by the submission endpoints.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::outcome::flatten_errors;

/// One document as reported by the upstream.
///
/// The upstream is loose with types: status codes and track ids arrive as
/// strings or numbers, error lists as strings or arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpstreamDocument {
    #[serde(rename = "StatusCode", default, deserialize_with = "loose_string")]
    pub status_code: Option<String>,
    #[serde(rename = "DocumentNumber", default, deserialize_with = "loose_string")]
    pub document_number: Option<String>,
    #[serde(rename = "TrackId", default, deserialize_with = "loose_string")]
    pub track_id: Option<String>,
    #[serde(rename = "Uuid", default, deserialize_with = "loose_string")]
    pub uuid: Option<String>,
    #[serde(rename = "StatusMessage", default, deserialize_with = "loose_string")]
    pub status_message: Option<String>,
    #[serde(rename = "StatusDescription", default, deserialize_with = "loose_string")]
    pub status_description: Option<String>,
    /// Signed XML, base64.
    #[serde(rename = "Document", default, deserialize_with = "loose_string")]
    pub document: Option<String>,
    /// Rendered PDF, base64.
    #[serde(rename = "Pdfdocument", default, deserialize_with = "loose_string")]
    pub pdf_document: Option<String>,
    #[serde(rename = "ErrorMessage", default, deserialize_with = "loose_list")]
    pub error_message: Vec<String>,
    #[serde(rename = "ErrorReason", default, deserialize_with = "loose_list")]
    pub error_reason: Vec<String>,
    #[serde(rename = "Warnings", default, deserialize_with = "loose_list")]
    pub warnings: Vec<String>,
    #[serde(default, deserialize_with = "loose_i64")]
    pub cdo_id: Option<i64>,
}

impl UpstreamDocument {
    /// Status code, if present and non-blank.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status_code
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric status 200.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.status().and_then(|s| s.parse::<u16>().ok()) == Some(200)
    }

    /// Every error line, in message, reason, warning order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.error_message
            .iter()
            .chain(&self.error_reason)
            .chain(&self.warnings)
            .filter(|line| !line.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// `{_size, _preview}` wrapper whose preview is JSON encoded as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "_size", default)]
    pub size: Option<Value>,
    #[serde(rename = "_preview")]
    pub preview: String,
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    })
}

fn loose_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(flatten_errors(Value::deserialize(deserializer)?))
}

fn loose_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
