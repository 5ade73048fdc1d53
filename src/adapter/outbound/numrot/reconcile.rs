//! Turns an upstream submission reply into per-document outcomes.
//!
//! Four reply shapes have been observed. They are tried in order and the
//! first one that yields a status code wins:
//!
//! 1. a flat object describing one document
//! 2. an array of such objects
//! 3. an envelope `{_size, _preview}` whose preview is shape 1 or 2 encoded
//!    as a JSON string
//! 4. the legacy batch reply (`message`, `lote`, `documentos_*`)

use serde_json::Value;

use super::dto::{Envelope, UpstreamDocument};
use crate::domain::outcome::processed_at_now;
use crate::domain::{
    BatchResponse, Document, DocumentKind, DocumentOutcome, FailedDocument, ProcessedDocument,
};
use crate::error::UpstreamError;

/// Error line used when a rejected document carries no message at all.
pub const UNKNOWN_ERROR: &str = "Error desconocido";

/// Recognised reply shape.
#[derive(Debug, Clone)]
pub enum ResponseShape {
    FlatSingle(UpstreamDocument),
    FlatArray(Vec<UpstreamDocument>),
    Envelope(Vec<UpstreamDocument>),
    Legacy(BatchResponse),
}

/// Outcomes extracted from one reply.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub outcomes: Vec<DocumentOutcome>,
    /// Batch id, only present on legacy replies.
    pub lote: Option<String>,
}

/// Identify the shape of `body`.
///
/// # Errors
///
/// [`UpstreamError::Decode`] when the body is not JSON or matches no shape.
pub fn parse_shape(body: &[u8]) -> Result<ResponseShape, UpstreamError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

    if let Some(documents) = parse_flat(&value) {
        return Ok(documents);
    }

    if let Ok(envelope) = serde_json::from_value::<Envelope>(value.clone()) {
        let inner: Value = serde_json::from_str(&envelope.preview)
            .map_err(|e| UpstreamError::Decode(format!("invalid _preview: {e}")))?;
        return match parse_flat(&inner) {
            Some(ResponseShape::FlatSingle(doc)) => Ok(ResponseShape::Envelope(vec![doc])),
            Some(ResponseShape::FlatArray(docs)) => Ok(ResponseShape::Envelope(docs)),
            _ => Err(UpstreamError::Decode(
                "_preview holds no document status".into(),
            )),
        };
    }

    if is_legacy(&value) {
        let reply = serde_json::from_value::<BatchResponse>(value)
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        return Ok(ResponseShape::Legacy(reply));
    }

    Err(UpstreamError::Decode(
        "reply matches no known response shape".into(),
    ))
}

fn parse_flat(value: &Value) -> Option<ResponseShape> {
    match value {
        Value::Object(_) => serde_json::from_value::<UpstreamDocument>(value.clone())
            .ok()
            .filter(|doc| doc.status().is_some())
            .map(ResponseShape::FlatSingle),
        Value::Array(_) => serde_json::from_value::<Vec<UpstreamDocument>>(value.clone())
            .ok()
            .filter(|docs| docs.iter().any(|doc| doc.status().is_some()))
            .map(ResponseShape::FlatArray),
        _ => None,
    }
}

fn is_legacy(value: &Value) -> bool {
    value.as_object().is_some_and(|map| {
        ["message", "lote", "documentos_procesados", "documentos_fallidos"]
            .iter()
            .any(|key| map.contains_key(*key))
    })
}

/// Reconcile a 200 reply for `inputs` of `kind`.
///
/// # Errors
///
/// [`UpstreamError::Decode`] when the body matches no known shape.
pub fn reconcile(
    kind: DocumentKind,
    inputs: &[Document],
    body: &[u8],
) -> Result<Reconciled, UpstreamError> {
    let documents = match parse_shape(body)? {
        ResponseShape::Legacy(reply) => return Ok(from_legacy(reply)),
        ResponseShape::FlatSingle(doc) => vec![doc],
        ResponseShape::FlatArray(docs) | ResponseShape::Envelope(docs) => docs,
    };

    let outcomes = documents
        .iter()
        .enumerate()
        .map(|(index, doc)| to_outcome(kind, inputs, index, doc))
        .collect();
    Ok(Reconciled {
        outcomes,
        lote: None,
    })
}

fn from_legacy(reply: BatchResponse) -> Reconciled {
    let lote = Some(reply.lote).filter(|l| !l.trim().is_empty());
    let outcomes = reply
        .documentos_procesados
        .into_iter()
        .map(DocumentOutcome::Succeeded)
        .chain(
            reply
                .documentos_fallidos
                .into_iter()
                .map(DocumentOutcome::Failed),
        )
        .collect();
    Reconciled { outcomes, lote }
}

fn to_outcome(
    kind: DocumentKind,
    inputs: &[Document],
    index: usize,
    doc: &UpstreamDocument,
) -> DocumentOutcome {
    let number = doc
        .document_number
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let matched = inputs
        .iter()
        .find(|input| !number.is_empty() && input.number() == number)
        .or_else(|| inputs.get(index));
    let (prefix, consecutive) = match matched {
        Some(input) => (input.prefix.clone(), input.consecutive.clone()),
        None => split_number(number),
    };

    if doc.is_accepted() {
        DocumentOutcome::Succeeded(ProcessedDocument {
            cdo_id: resolve_cdo_id(doc, &consecutive),
            prefix,
            consecutive,
            xml_base64: doc.document.clone().filter(|s| !s.is_empty()),
            pdf_base64: doc.pdf_document.clone().filter(|s| !s.is_empty()),
            processed_at: processed_at_now(),
        })
    } else {
        let mut errors = doc.errors();
        if errors.is_empty() {
            errors.push(UNKNOWN_ERROR.to_string());
        }
        DocumentOutcome::Failed(FailedDocument {
            kind: kind.code().to_string(),
            prefix,
            consecutive,
            errors,
            processed_at: processed_at_now(),
        })
    }
}

/// Explicit `cdo_id`, then a numeric track id, then the numeric consecutive.
fn resolve_cdo_id(doc: &UpstreamDocument, consecutive: &str) -> i64 {
    doc.cdo_id
        .or_else(|| {
            doc.track_id
                .as_deref()
                .and_then(|id| id.trim().parse().ok())
        })
        .or_else(|| consecutive.trim().parse().ok())
        .unwrap_or(0)
}

/// Split `SETT5604` into `("SETT", "5604")` at the first digit.
#[must_use]
pub fn split_number(number: &str) -> (String, String) {
    match number.find(|c: char| c.is_ascii_digit()) {
        Some(at) => (number[..at].to_string(), number[at..].to_string()),
        None => (number.to_string(), String::new()),
    }
}
