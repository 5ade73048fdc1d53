//! Upstream (Numrot) connection settings.

use serde::Deserialize;

/// Upstream environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Habilitación (test set).
    #[default]
    Test,
    /// Producción.
    #[serde(alias = "produccion", alias = "prod")]
    Production,
}

impl Environment {
    /// `ProfileExecutionID` on the wire.
    #[must_use]
    pub const fn profile_execution_id(self) -> &'static str {
        match self {
            Self::Production => "1",
            Self::Test => "2",
        }
    }

    /// Check digit used when a NIT carries none.
    #[must_use]
    pub const fn fallback_dv(self) -> &'static str {
        match self {
            Self::Production => "6",
            Self::Test => "2",
        }
    }

    /// Parse the environment variable spelling.
    #[must_use]
    pub fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "test" | "pruebas" | "habilitacion" => Some(Self::Test),
            "production" | "produccion" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// HTTP client settings for upstream calls.
#[derive(Debug, Clone, Deserialize)]
pub struct NumrotHttpConfig {
    /// Per-call timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    60_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for NumrotHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
        }
    }
}

/// Upstream endpoints and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct NumrotConfig {
    /// Base URL for token, submission and query endpoints.
    #[serde(default)]
    pub base_url: String,
    /// Separate host for support documents; falls back to `base_url`.
    #[serde(default)]
    pub ds_base_url: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Bearer token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Radian API key.
    #[serde(default)]
    pub key: String,
    /// Radian API secret.
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub http: NumrotHttpConfig,
}

const fn default_token_ttl_secs() -> u64 {
    3300
}

impl NumrotConfig {
    /// Base URL used for support documents.
    #[must_use]
    pub fn ds_base_url(&self) -> &str {
        self.ds_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&self.base_url)
    }
}

impl Default for NumrotConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            ds_base_url: None,
            username: String::new(),
            password: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
            key: String::new(),
            secret: String::new(),
            environment: Environment::default(),
            http: NumrotHttpConfig::default(),
        }
    }
}
