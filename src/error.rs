use thiserror::Error;

use crate::domain::error::DomainError;
use crate::port::TransportError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised while talking to the upstream provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("upstream rejected the bearer token (401)")]
    Unauthorized,

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("document not found ({code}): {message}")]
    DocumentNotFound { code: String, message: String },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl UpstreamError {
    /// True when the failure came from a transport timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

/// Errors raised while building the upstream payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("issuer NIT is required")]
    MissingIssuerNit,

    #[error("invalid amount for {field}: '{value}'")]
    InvalidAmount { field: &'static str, value: String },

    #[error("failed to encode payload: {0}")]
    Encode(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("no documents supplied")]
    NoDocuments,

    #[error("batch of {size} documents exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// HTTP status a caller-facing surface should answer with.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Domain(_)
            | Self::Transform(_)
            | Self::NoDocuments
            | Self::BatchTooLarge { .. }
            | Self::Json(_) => 400,
            Self::Upstream(UpstreamError::DocumentNotFound { .. }) => 404,
            Self::Upstream(err) if err.is_timeout() => 504,
            Self::Upstream(_) => 502,
            Self::Config(_) | Self::Io(_) | Self::Url(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_error_kind() {
        assert_eq!(Error::NoDocuments.http_status(), 400);
        assert_eq!(
            Error::Domain(DomainError::RejectionCodeRequired).http_status(),
            400
        );
        assert_eq!(
            Error::Upstream(UpstreamError::AuthFailed("nope".into())).http_status(),
            502
        );
        assert_eq!(
            Error::Upstream(UpstreamError::DocumentNotFound {
                code: "404".into(),
                message: "x".into()
            })
            .http_status(),
            404
        );
        assert_eq!(
            Error::Upstream(UpstreamError::Transport(TransportError::Timeout(
                "slow".into()
            )))
            .http_status(),
            504
        );
    }
}
