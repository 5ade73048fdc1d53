//! Per-document outcomes and the batch reply.
//!
//! The reply keeps the legacy field names callers already consume
//! (`documentos_procesados`, `documentos_fallidos`, ...).

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::document::{Document, DocumentKind};

/// Message used when every document succeeded.
pub const MSG_ALL_OK: &str = "Documentos procesados exitosamente";
/// Message used when every document failed.
pub const MSG_ALL_FAILED: &str = "Error al procesar documentos";
/// Message used for mixed batches.
pub const MSG_PARTIAL: &str = "Algunos documentos fueron procesados, otros fallaron";
/// Message used when nothing was counted either way.
pub const MSG_DONE: &str = "Procesamiento completado";

/// Bogotá has no daylight saving time, so a fixed offset is exact.
const BOGOTA_OFFSET_SECS: i32 = -5 * 3600;

/// The America/Bogotá offset (UTC-05:00).
#[must_use]
pub fn bogota_offset() -> FixedOffset {
    FixedOffset::east_opt(BOGOTA_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current time in Bogotá.
#[must_use]
pub fn now_bogota() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&bogota_offset())
}

/// Processing timestamp as reported to callers.
#[must_use]
pub fn processed_at_now() -> String {
    now_bogota().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A document accepted upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    #[serde(default, deserialize_with = "deserialize_cdo_id")]
    pub cdo_id: i64,
    #[serde(rename = "prefijo", default)]
    pub prefix: String,
    #[serde(rename = "consecutivo", default)]
    pub consecutive: String,
    #[serde(rename = "xml", default, skip_serializing_if = "Option::is_none")]
    pub xml_base64: Option<String>,
    #[serde(rename = "pdf", default, skip_serializing_if = "Option::is_none")]
    pub pdf_base64: Option<String>,
    #[serde(rename = "fecha_procesamiento", default)]
    pub processed_at: String,
}

/// A document rejected upstream or never submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDocument {
    #[serde(rename = "documento", default)]
    pub kind: String,
    #[serde(rename = "prefijo", default)]
    pub prefix: String,
    #[serde(rename = "consecutivo", default)]
    pub consecutive: String,
    #[serde(default, deserialize_with = "deserialize_errors")]
    pub errors: Vec<String>,
    #[serde(rename = "fecha_procesamiento", default)]
    pub processed_at: String,
}

/// Exactly one of these is produced for every input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Succeeded(ProcessedDocument),
    Failed(FailedDocument),
}

impl DocumentOutcome {
    /// Failed outcome for `document` carrying a single error message.
    #[must_use]
    pub fn failed(kind: DocumentKind, document: &Document, error: impl Into<String>) -> Self {
        Self::Failed(FailedDocument {
            kind: kind.code().to_string(),
            prefix: document.prefix.clone(),
            consecutive: document.consecutive.clone(),
            errors: vec![error.into()],
            processed_at: processed_at_now(),
        })
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        match self {
            Self::Succeeded(doc) => &doc.prefix,
            Self::Failed(doc) => &doc.prefix,
        }
    }

    #[must_use]
    pub fn consecutive(&self) -> &str {
        match self {
            Self::Succeeded(doc) => &doc.consecutive,
            Self::Failed(doc) => &doc.consecutive,
        }
    }

    /// True when this outcome describes `document`.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.prefix() == document.prefix && self.consecutive() == document.consecutive
    }
}

/// Batch reply returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub lote: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub documentos_procesados: Vec<ProcessedDocument>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub documentos_fallidos: Vec<FailedDocument>,
}

impl BatchResponse {
    /// Assemble a reply from ordered outcomes, choosing the batch message.
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<DocumentOutcome>, lote: Option<String>) -> Self {
        let mut processed = Vec::new();
        let mut failed = Vec::new();
        for outcome in outcomes {
            match outcome {
                DocumentOutcome::Succeeded(doc) => processed.push(doc),
                DocumentOutcome::Failed(doc) => failed.push(doc),
            }
        }
        Self {
            message: batch_message(processed.len(), failed.len()).to_string(),
            lote: lote.unwrap_or_else(placeholder_lote),
            documentos_procesados: processed,
            documentos_fallidos: failed,
        }
    }

    /// Total number of outcomes in the reply.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documentos_procesados.len() + self.documentos_fallidos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Batch-level message for the given counts.
#[must_use]
pub const fn batch_message(succeeded: usize, failed: usize) -> &'static str {
    match (succeeded, failed) {
        (s, 0) if s > 0 => MSG_ALL_OK,
        (0, f) if f > 0 => MSG_ALL_FAILED,
        (s, f) if s > 0 && f > 0 => MSG_PARTIAL,
        _ => MSG_DONE,
    }
}

/// Timestamp-derived lote used when upstream did not return one.
#[must_use]
pub fn placeholder_lote() -> String {
    format!("LOTE-{}", now_bogota().format("%Y%m%d%H%M%S%3f"))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a string, an array of strings, or an array of anything.
fn deserialize_errors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(flatten_errors(value))
}

/// Number, numeric string or null; anything unreadable is 0.
fn deserialize_cdo_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

pub(crate) fn flatten_errors(value: serde_json::Value) -> Vec<String> {
    use serde_json::Value;
    match value {
        Value::Null => Vec::new(),
        Value::String(s) if s.is_empty() => Vec::new(),
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processed(prefix: &str, consecutive: &str) -> DocumentOutcome {
        DocumentOutcome::Succeeded(ProcessedDocument {
            cdo_id: 1,
            prefix: prefix.into(),
            consecutive: consecutive.into(),
            xml_base64: None,
            pdf_base64: None,
            processed_at: processed_at_now(),
        })
    }

    #[test]
    fn batch_message_covers_all_cases() {
        assert_eq!(batch_message(2, 0), MSG_ALL_OK);
        assert_eq!(batch_message(0, 3), MSG_ALL_FAILED);
        assert_eq!(batch_message(1, 1), MSG_PARTIAL);
        assert_eq!(batch_message(0, 0), MSG_DONE);
    }

    #[test]
    fn from_outcomes_splits_and_preserves_order() {
        let doc = Document {
            prefix: "SETT".into(),
            consecutive: "2".into(),
            ..Default::default()
        };
        let outcomes = vec![
            processed("SETT", "1"),
            DocumentOutcome::failed(DocumentKind::Invoice, &doc, "boom"),
            processed("SETT", "3"),
        ];
        let reply = BatchResponse::from_outcomes(outcomes, Some("L1".into()));
        assert_eq!(reply.message, MSG_PARTIAL);
        assert_eq!(reply.lote, "L1");
        assert_eq!(reply.documentos_procesados[0].consecutive, "1");
        assert_eq!(reply.documentos_procesados[1].consecutive, "3");
        assert_eq!(reply.documentos_fallidos[0].errors, vec!["boom"]);
        assert_eq!(reply.len(), 3);
    }

    #[test]
    fn missing_lote_gets_placeholder() {
        let reply = BatchResponse::from_outcomes(vec![], None);
        assert!(reply.lote.starts_with("LOTE-"));
        assert_eq!(reply.message, MSG_DONE);
    }

    #[test]
    fn reply_serializes_empty_arrays_not_null() {
        let reply = BatchResponse::from_outcomes(vec![], Some("x".into()));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["documentos_procesados"], serde_json::json!([]));
        assert_eq!(json["documentos_fallidos"], serde_json::json!([]));
    }

    #[test]
    fn legacy_errors_accept_string_or_array() {
        let single: FailedDocument =
            serde_json::from_str(r#"{"prefijo":"A","consecutivo":"1","errors":"bad"}"#).unwrap();
        assert_eq!(single.errors, vec!["bad"]);

        let mixed: FailedDocument =
            serde_json::from_str(r#"{"prefijo":"A","consecutivo":"1","errors":["x", 42, {"k":1}]}"#)
                .unwrap();
        assert_eq!(mixed.errors, vec!["x".to_string(), "42".into(), r#"{"k":1}"#.into()]);
    }

    #[test]
    fn null_arrays_deserialize_as_empty() {
        let reply: BatchResponse = serde_json::from_str(
            r#"{"message":"m","lote":"l","documentos_procesados":null,"documentos_fallidos":null}"#,
        )
        .unwrap();
        assert!(reply.is_empty());
    }

    #[test]
    fn cdo_id_accepts_number_string_or_null() {
        let parse = |raw: &str| {
            serde_json::from_str::<ProcessedDocument>(&format!(r#"{{"cdo_id":{raw}}}"#))
                .unwrap()
                .cdo_id
        };
        assert_eq!(parse("12"), 12);
        assert_eq!(parse(r#"" 12 ""#), 12);
        assert_eq!(parse("null"), 0);
        assert_eq!(parse(r#""n/a""#), 0);
    }

    #[test]
    fn bogota_offset_is_minus_five() {
        assert_eq!(bogota_offset().local_minus_utc(), -5 * 3600);
    }
}
