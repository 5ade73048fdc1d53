//! HTTP transport port.
//!
//! One call to [`HttpTransport::send`] is one HTTP exchange with the upstream.
//! Retries, authentication and flow control live above this seam so they can
//! be exercised against a scripted transport in tests.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Substrings that identify a timeout when the error is not typed.
const TIMEOUT_SIGNATURES: [&str; 3] = ["timeout", "deadline exceeded", "Client.Timeout"];

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A fully prepared upstream request.
///
/// The body is kept as bytes so the exact same payload can be re-sent on
/// every retry attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub bearer: Option<String>,
    /// JSON body; sent with `Content-Type: application/json`.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            bearer: None,
            body: None,
        }
    }

    /// POST with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `body` cannot be encoded.
    pub fn post_json<T: serde::Serialize + ?Sized>(
        url: impl Into<String>,
        body: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method: HttpMethod::Post,
            url: url.into(),
            bearer: None,
            body: Some(serde_json::to_vec(body)?),
        })
    }

    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Body parsed back as JSON, mostly useful for assertions.
    #[must_use]
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

/// Status and (already decompressed) body of an upstream reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failure to complete an HTTP exchange (no status was received).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timeout: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// True for typed timeouts and for errors whose message carries a
    /// timeout signature.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Connect(msg) | Self::Other(msg) => {
                TIMEOUT_SIGNATURES.iter().any(|sig| msg.contains(sig))
            }
        }
    }
}

/// Performs a single HTTP exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the reply, whatever its status.
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_timeout_is_timeout() {
        assert!(TransportError::Timeout("x".into()).is_timeout());
    }

    #[test]
    fn signature_match_is_timeout() {
        assert!(TransportError::Other("context deadline exceeded".into()).is_timeout());
        assert!(TransportError::Other("net/http: Client.Timeout exceeded".into()).is_timeout());
        assert!(TransportError::Connect("i/o timeout".into()).is_timeout());
    }

    #[test]
    fn other_errors_are_not_timeouts() {
        assert!(!TransportError::Connect("connection refused".into()).is_timeout());
        assert!(!TransportError::Other("tls handshake".into()).is_timeout());
    }

    #[test]
    fn post_json_keeps_body_bytes() {
        let req = HttpRequest::post_json("http://x", &serde_json::json!({"a": 1}))
            .unwrap()
            .with_bearer("tok");
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.bearer.as_deref(), Some("tok"));
        assert_eq!(req.json_body().unwrap()["a"], 1);
    }

    #[test]
    fn reply_text_is_lossy() {
        let reply = HttpReply::new(200, b"ok".to_vec());
        assert!(reply.is_ok());
        assert_eq!(reply.text(), "ok");
    }
}
