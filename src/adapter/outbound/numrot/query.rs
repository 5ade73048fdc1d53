//! Read-only upstream lookups (resolutions, document info, DIAN states).
//!
//! These use the same cached bearer token as submissions but bypass the
//! dispatch flow control: they are single operator calls, not batches.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::auth::AuthManager;
use super::endpoint;
use crate::error::{Result, UpstreamError};
use crate::port::{HttpRequest, HttpTransport};

/// Client for the bearer-authenticated GET endpoints.
pub struct QueryClient {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<AuthManager>,
    base_url: String,
}

impl QueryClient {
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, auth: Arc<AuthManager>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            auth,
            base_url: base_url.into(),
        }
    }

    /// Resolutions authorised for `nit`.
    ///
    /// # Errors
    ///
    /// Returns an error when the token cannot be obtained or the upstream
    /// answers with a non-200 status.
    pub async fn list_resolutions(&self, nit: &str) -> Result<Value> {
        info!(nit, "Listing resolutions");
        self.get_json(&endpoint::resolutions(&self.base_url, nit)).await
    }

    /// Document identified by its CUFE.
    ///
    /// # Errors
    ///
    /// [`UpstreamError::DocumentNotFound`] on 404, otherwise as
    /// [`Self::list_resolutions`].
    pub async fn document_info(&self, nit: &str, cufe: &str) -> Result<Value> {
        info!(nit, cufe, "Fetching document info");
        self.get_json(&endpoint::document_info(&self.base_url, nit, cufe))
            .await
    }

    /// Document with its DIAN state history, XML and PDF.
    ///
    /// # Errors
    ///
    /// As [`Self::document_info`].
    pub async fn search_states(&self, nit: &str, number: &str) -> Result<Value> {
        info!(nit, number, "Searching DIAN states");
        self.get_json(&endpoint::search_states(&self.base_url, nit, number))
            .await
    }

    /// GET `url`; a 401 refreshes the token and retries once.
    async fn get_json(&self, url: &str) -> Result<Value> {
        let mut refreshed = false;
        loop {
            let token = self.auth.token().await?;
            let reply = self
                .transport
                .send(HttpRequest::get(url).with_bearer(token))
                .await
                .map_err(UpstreamError::from)?;

            match reply.status {
                200 => {
                    debug!(url, bytes = reply.body.len(), "Query succeeded");
                    if reply.body.iter().all(u8::is_ascii_whitespace) {
                        return Ok(Value::Null);
                    }
                    return serde_json::from_slice(&reply.body)
                        .map_err(|e| UpstreamError::Decode(e.to_string()).into());
                }
                401 => {
                    self.auth.clear_token();
                    if refreshed {
                        return Err(UpstreamError::Unauthorized.into());
                    }
                    warn!(url, "Token rejected, retrying with a fresh one");
                    refreshed = true;
                }
                404 => {
                    return Err(UpstreamError::DocumentNotFound {
                        code: "404".into(),
                        message: reply.text(),
                    }
                    .into());
                }
                status => {
                    return Err(UpstreamError::Status {
                        status,
                        body: reply.text(),
                    }
                    .into());
                }
            }
        }
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::Error;
    use crate::port::HttpReply;
    use crate::testkit::transport::ScriptedTransport;

    fn client(transport: &Arc<ScriptedTransport>) -> QueryClient {
        let auth = Arc::new(AuthManager::new(
            Arc::clone(transport) as Arc<dyn HttpTransport>,
            "https://numrot.test",
            "u",
            "p",
            Duration::from_secs(60),
        ));
        QueryClient::new(Arc::clone(transport) as Arc<dyn HttpTransport>, auth, "https://numrot.test")
    }

    #[tokio::test]
    async fn unauthorized_retries_once_with_fresh_token() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(200, "t1"));
        transport.push_reply(HttpReply::new(401, ""));
        transport.push_reply(HttpReply::new(200, "t2"));
        transport.push_reply(HttpReply::new(200, r#"[{"prefix":"SETT"}]"#));

        let value = client(&transport).list_resolutions("860011153").await.unwrap();
        assert_eq!(value[0]["prefix"], "SETT");

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[1].url, "https://numrot.test/api/Resoluciones/860011153");
        assert_eq!(requests[3].bearer.as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn not_found_is_document_not_found() {
        let transport = Arc::new(ScriptedTransport::new().with_token("t"));
        transport.push_reply(HttpReply::new(404, "no such cufe"));

        let err = client(&transport)
            .document_info("860011153", "abc")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream(UpstreamError::DocumentNotFound { .. })
        ));
        assert_eq!(err.http_status(), 404);
    }

    #[tokio::test]
    async fn search_states_requests_xml_and_pdf() {
        let transport = Arc::new(ScriptedTransport::new().with_token("t"));
        transport.push_reply(HttpReply::new(200, r#"{"estado":"aceptado"}"#));

        client(&transport).search_states("860011153", "SETT1").await.unwrap();
        let url = &transport.document_requests()[0].url;
        assert!(url.ends_with("/api/searchestadosdian/860011153/SETT1?includeXml=true&includePdf=true"));
    }
}
