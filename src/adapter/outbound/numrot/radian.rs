//! Radian endpoints: document listings and lifecycle events.
//!
//! Authentication is by key and secret inside every request body.

use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::endpoint;
use crate::domain::error::DomainError;
use crate::domain::event::{
    require_bounded, validate_rejection, DateRange, EventKind, MAX_GENERATOR_FIELD_LEN,
};
use crate::domain::outcome::bogota_offset;
use crate::error::{Result, UpstreamError};
use crate::infrastructure::config::issuer::IssuerConfig;
use crate::infrastructure::config::numrot::NumrotConfig;
use crate::port::{HttpRequest, HttpTransport};

const DATE_FORMAT: &str = "%Y-%m-%d";
const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lifecycle event to register against a received document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    pub kind: EventKind,
    /// Full number (prefix + consecutive) of the received document.
    pub document_number: String,
    pub supplier_nit: String,
    pub supplier_name: String,
    pub rejection_code: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SetEventBody<'a> {
    key: &'a str,
    secret: &'a str,
    emisor_nit: &'a str,
    razon_social: &'a str,
    documento_numero_completo: &'a str,
    codigo_radian: [&'a str; 1],
    fecha_generacion_evento: String,
    nombre_generador: &'a str,
    apellido_generador: &'a str,
    identificacion_generador: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    codigo_rechazo: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RangeBody<'a> {
    key: &'a str,
    secret: &'a str,
    nit: &'a str,
    fecha_inicial: String,
    fecha_final: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ByNumberBody<'a> {
    key: &'a str,
    secret: &'a str,
    emisor_nit: &'a str,
    receptor_nit: &'a str,
    documento_numero_completo: &'a str,
}

/// Error body the upstream uses for unknown documents.
#[derive(Deserialize)]
struct NotFoundBody {
    code: Value,
    error: Value,
}

/// Client for the Radian endpoints.
pub struct RadianClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    key: String,
    secret: String,
    issuer: IssuerConfig,
}

impl RadianClient {
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, numrot: &NumrotConfig, issuer: &IssuerConfig) -> Self {
        Self {
            transport,
            base_url: numrot.base_url.clone(),
            key: numrot.key.clone(),
            secret: numrot.secret.clone(),
            issuer: issuer.clone(),
        }
    }

    /// Documents emitted by the issuer within `range`.
    ///
    /// # Errors
    ///
    /// Returns an error when the upstream answers with a non-200 status.
    pub async fn emitted_documents(&self, range: &DateRange) -> Result<Value> {
        let body = self.range_body(range);
        self.post(endpoint::RADIAN_INFO_PATH, &body).await
    }

    /// Documents received by the issuer within `range`.
    ///
    /// # Errors
    ///
    /// As [`Self::emitted_documents`].
    pub async fn received_documents(&self, range: &DateRange) -> Result<Value> {
        let body = self.range_body(range);
        self.post(endpoint::RADIAN_RECEIVED_PATH, &body).await
    }

    /// A single received document by supplier and number.
    ///
    /// # Errors
    ///
    /// [`DomainError::MissingField`] for blank arguments,
    /// [`UpstreamError::DocumentNotFound`] when the upstream does not know it.
    pub async fn document_by_number(&self, supplier_nit: &str, number: &str) -> Result<Value> {
        require_bounded("supplier_nit", supplier_nit, MAX_GENERATOR_FIELD_LEN)?;
        require_bounded("document_number", number, MAX_GENERATOR_FIELD_LEN)?;
        let body = ByNumberBody {
            key: &self.key,
            secret: &self.secret,
            emisor_nit: supplier_nit.trim(),
            receptor_nit: self.issuer.nit.trim(),
            documento_numero_completo: number.trim(),
        };
        self.post(endpoint::RADIAN_BY_NUMBER_PATH, &body).await
    }

    /// Register a lifecycle event.
    ///
    /// # Errors
    ///
    /// Domain validation errors for bad input (missing rejection code on a
    /// RECLAMO, over-long generator fields, ...), upstream errors otherwise.
    pub async fn register_event(&self, request: &EventRequest) -> Result<Value> {
        let rejection = validate_rejection(request.kind, request.rejection_code.as_deref())?;
        require_bounded("document_number", &request.document_number, MAX_GENERATOR_FIELD_LEN)?;
        require_bounded("supplier_nit", &request.supplier_nit, MAX_GENERATOR_FIELD_LEN)?;
        require_bounded("supplier_name", &request.supplier_name, 450)?;
        self.validate_generator()?;

        let body = SetEventBody {
            key: &self.key,
            secret: &self.secret,
            emisor_nit: request.supplier_nit.trim(),
            razon_social: request.supplier_name.trim(),
            documento_numero_completo: request.document_number.trim(),
            codigo_radian: [request.kind.radian_code()],
            fecha_generacion_evento: self.event_timestamp(),
            nombre_generador: self.issuer.generator_first_name.trim(),
            apellido_generador: self.issuer.generator_last_name.trim(),
            identificacion_generador: self.issuer.generator_id.trim(),
            codigo_rechazo: rejection.as_ref().map(|code| code.as_str()),
        };

        info!(
            kind = %request.kind,
            code = request.kind.radian_code(),
            document = %request.document_number,
            "Registering Radian event"
        );
        self.post(endpoint::RADIAN_EVENT_PATH, &body).await
    }

    fn validate_generator(&self) -> std::result::Result<(), DomainError> {
        require_bounded(
            "generator_first_name",
            &self.issuer.generator_first_name,
            MAX_GENERATOR_FIELD_LEN,
        )?;
        require_bounded(
            "generator_last_name",
            &self.issuer.generator_last_name,
            MAX_GENERATOR_FIELD_LEN,
        )?;
        require_bounded("generator_id", &self.issuer.generator_id, MAX_GENERATOR_FIELD_LEN)
    }

    fn range_body(&self, range: &DateRange) -> RangeBody<'_> {
        RangeBody {
            key: &self.key,
            secret: &self.secret,
            nit: self.issuer.nit.trim(),
            fecha_inicial: range.start.format(DATE_FORMAT).to_string(),
            fecha_final: range.end.format(DATE_FORMAT).to_string(),
        }
    }

    fn event_timestamp(&self) -> String {
        let offset = self
            .issuer
            .utc_offset
            .trim()
            .parse::<FixedOffset>()
            .unwrap_or_else(|_| bogota_offset());
        Utc::now()
            .with_timezone(&offset)
            .format(EVENT_TIMESTAMP_FORMAT)
            .to_string()
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value> {
        let url = endpoint::join(&self.base_url, path);
        let request = HttpRequest::post_json(url, body)?;
        let reply = self
            .transport
            .send(request)
            .await
            .map_err(UpstreamError::from)?;

        match reply.status {
            200 => {
                if reply.body.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Value::Null);
                }
                serde_json::from_slice(&reply.body)
                    .map_err(|e| UpstreamError::Decode(e.to_string()).into())
            }
            400 => match serde_json::from_slice::<NotFoundBody>(&reply.body) {
                Ok(body) => Err(UpstreamError::DocumentNotFound {
                    code: value_text(body.code),
                    message: value_text(body.error),
                }
                .into()),
                Err(_) => Err(UpstreamError::Status {
                    status: 400,
                    body: reply.text(),
                }
                .into()),
            },
            status => {
                warn!(path, status, "Radian call failed");
                Err(UpstreamError::Status {
                    status,
                    body: reply.text(),
                }
                .into())
            }
        }
    }
}

impl std::fmt::Debug for RadianClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadianClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::port::HttpReply;
    use crate::testkit::transport::ScriptedTransport;

    fn issuer() -> IssuerConfig {
        IssuerConfig {
            nit: "860011153".into(),
            generator_first_name: "Ana".into(),
            generator_last_name: "Pérez".into(),
            generator_id: "1020304050".into(),
            ..Default::default()
        }
    }

    fn client(transport: &Arc<ScriptedTransport>, issuer: &IssuerConfig) -> RadianClient {
        let numrot = NumrotConfig {
            base_url: "https://numrot.test".into(),
            key: "k".into(),
            secret: "s".into(),
            ..Default::default()
        };
        RadianClient::new(Arc::clone(transport) as Arc<dyn HttpTransport>, &numrot, issuer)
    }

    fn event(kind: EventKind, rejection: Option<&str>) -> EventRequest {
        EventRequest {
            kind,
            document_number: "FE123".into(),
            supplier_nit: "900123456".into(),
            supplier_name: "Proveedor SAS".into(),
            rejection_code: rejection.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn reclamo_body_carries_code_and_rejection() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(200, r#"{"ok":true}"#));

        client(&transport, &issuer())
            .register_event(&event(EventKind::Reclamo, Some("02")))
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url, "https://numrot.test/api/Radian/SetEvent");
        assert!(request.bearer.is_none());
        let body = request.json_body().unwrap();
        assert_eq!(body["Key"], "k");
        assert_eq!(body["CodigoRadian"], serde_json::json!(["031"]));
        assert_eq!(body["CodigoRechazo"], "02");
        assert_eq!(body["NombreGenerador"], "Ana");
        assert_eq!(body["FechaGeneracionEvento"].as_str().unwrap().len(), 19);
    }

    #[tokio::test]
    async fn reclamo_without_code_is_rejected_before_sending() {
        let transport = Arc::new(ScriptedTransport::new());
        let err = client(&transport, &issuer())
            .register_event(&event(EventKind::Reclamo, None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Domain(DomainError::RejectionCodeRequired)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn over_long_generator_name_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut issuer = issuer();
        issuer.generator_first_name = "x".repeat(101);
        let err = client(&transport, &issuer)
            .register_event(&event(EventKind::Acuse, None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Domain(DomainError::FieldTooLong { .. })));
    }

    #[tokio::test]
    async fn bad_request_with_code_body_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(400, r#"{"code": 89, "error": "Documento no existe"}"#));
        let err = client(&transport, &issuer())
            .register_event(&event(EventKind::Aceptacion, None))
            .await
            .unwrap_err();
        match err {
            Error::Upstream(UpstreamError::DocumentNotFound { code, message }) => {
                assert_eq!(code, "89");
                assert_eq!(message, "Documento no existe");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_request_without_code_body_is_status_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(400, "bad"));
        let err = client(&transport, &issuer())
            .register_event(&event(EventKind::Acuse, None))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 502);
    }

    #[tokio::test]
    async fn range_listing_formats_dates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(200, "[]"));
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        client(&transport, &issuer())
            .received_documents(&range)
            .await
            .unwrap();
        let body = transport.requests()[0].json_body().unwrap();
        assert_eq!(body["FechaInicial"], "2024-01-01");
        assert_eq!(body["FechaFinal"], "2024-01-31");
        assert_eq!(body["Nit"], "860011153");
    }
}
