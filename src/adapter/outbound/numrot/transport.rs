//! reqwest-backed [`HttpTransport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use crate::infrastructure::config::numrot::NumrotHttpConfig;
use crate::port::{HttpMethod, HttpReply, HttpRequest, HttpTransport, TransportError};

/// Shared HTTP client for every upstream call.
///
/// Gzip replies are decoded by reqwest before the body reaches callers.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    #[must_use]
    pub fn from_config(config: &NumrotHttpConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .gzip(true)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self { http }
    }

    fn classify(err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
            HttpMethod::Post => self.http.post(&request.url),
        }
        .header(ACCEPT_ENCODING, "gzip");

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(|e| Self::classify(&e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| Self::classify(&e))?;

        debug!(
            method = %request.method,
            url = %request.url,
            status,
            bytes = body.len(),
            "Upstream exchange complete"
        );
        Ok(HttpReply::new(status, body.to_vec()))
    }
}
