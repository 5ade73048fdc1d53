//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all gateway settings.
//! Configuration is loaded from an optional TOML file, then overlaid with the
//! `NUMROT_*`, `RES_*` and `NC_PERIOD_*` environment variables so secrets never
//! have to live in the file.
//!
//! # Example
//!
//! ```no_run
//! use numrot_gateway::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::dispatch::DispatchConfig;
use super::issuer::{CreditNotePeriodConfig, IssuerConfig, ResolutionConfig};
use super::logging::LoggingConfig;
use super::numrot::{Environment, NumrotConfig};
use crate::error::{ConfigError, Result};

/// Main gateway configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Upstream endpoints and credentials.
    #[serde(default)]
    pub numrot: NumrotConfig,

    /// Worker pool and flow-control settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Issuing company and event generator identity.
    #[serde(default)]
    pub issuer: IssuerConfig,

    /// Fallback resolution used while resolutions are disabled.
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Period for credit notes without reference.
    #[serde(default)]
    pub credit_note_period: CreditNotePeriodConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, an override has an invalid
    /// value, or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`Self::parse_toml`] fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Build configuration from defaults and the environment only.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is invalid or validation fails.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values returned by `lookup` for the known variable names.
    ///
    /// Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for numeric or boolean variables
    /// that do not parse.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let strings: [(&str, &mut String); 23] = [
            ("NUMROT_BASE_URL", &mut self.numrot.base_url),
            ("NUMROT_USERNAME", &mut self.numrot.username),
            ("NUMROT_PASSWORD", &mut self.numrot.password),
            ("NUMROT_KEY", &mut self.numrot.key),
            ("NUMROT_SECRET", &mut self.numrot.secret),
            ("NUMROT_EMISOR_NIT", &mut self.issuer.nit),
            ("NUMROT_NOMBRE_GENERADOR", &mut self.issuer.generator_first_name),
            ("NUMROT_APELLIDO_GENERADOR", &mut self.issuer.generator_last_name),
            ("NUMROT_IDENTIFICACION_GENERADOR", &mut self.issuer.generator_id),
            ("NUMROT_NOTIFICATION_EMAIL", &mut self.issuer.notification_email),
            ("RES_AUTHORIZATION", &mut self.resolution.authorization),
            ("RES_START_DATE", &mut self.resolution.start_date),
            ("RES_END_DATE", &mut self.resolution.end_date),
            ("RES_PREFIX", &mut self.resolution.prefix),
            ("RES_FROM", &mut self.resolution.from),
            ("RES_TO", &mut self.resolution.to),
            ("NC_PERIOD_START_DATE", &mut self.credit_note_period.start_date),
            ("NC_PERIOD_START_TIME", &mut self.credit_note_period.start_time),
            ("NC_PERIOD_END_DATE", &mut self.credit_note_period.end_date),
            ("NC_PERIOD_END_TIME", &mut self.credit_note_period.end_time),
            ("LOG_LEVEL", &mut self.logging.level),
            ("LOG_FORMAT", &mut self.logging.format),
            ("NUMROT_UTC_OFFSET", &mut self.issuer.utc_offset),
        ];
        for (key, slot) in strings {
            if let Some(value) = get(key) {
                *slot = value.trim().to_string();
            }
        }

        if let Some(value) = get("NUMROT_DS_BASE_URL") {
            self.numrot.ds_base_url = Some(value.trim().to_string());
        }
        if let Some(value) = get("NUMROT_ENVIRONMENT") {
            self.numrot.environment =
                Environment::from_env_value(&value).ok_or(ConfigError::InvalidValue {
                    field: "NUMROT_ENVIRONMENT",
                    reason: format!("unknown environment '{value}'"),
                })?;
        }
        if let Some(value) = get("NUMROT_TOKEN_TTL") {
            self.numrot.token_ttl_secs = parse_number("NUMROT_TOKEN_TTL", &value)?;
        }
        if let Some(value) = get("NUMROT_MAX_CONCURRENT") {
            self.dispatch.max_concurrent = parse_number("NUMROT_MAX_CONCURRENT", &value)?;
        }
        if let Some(value) = get("NUMROT_BATCH_SIZE") {
            self.dispatch.batch_size = parse_number("NUMROT_BATCH_SIZE", &value)?;
        }
        if let Some(value) = get("NUMROT_RATE_LIMIT_RPS") {
            self.dispatch.rate_limit_rps = parse_number("NUMROT_RATE_LIMIT_RPS", &value)?;
        }
        if let Some(value) = get("RES_DISABLED") {
            self.resolution.disabled = parse_bool("RES_DISABLED", &value)?;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error when a required field is missing or a value is out of
    /// range.
    pub fn validate(&self) -> Result<()> {
        if self.numrot.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "NUMROT_BASE_URL",
            }
            .into());
        }
        url::Url::parse(&self.numrot.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "NUMROT_BASE_URL",
            reason: e.to_string(),
        })?;
        if let Some(ds) = self.numrot.ds_base_url.as_deref().filter(|u| !u.is_empty()) {
            url::Url::parse(ds).map_err(|e| ConfigError::InvalidValue {
                field: "NUMROT_DS_BASE_URL",
                reason: e.to_string(),
            })?;
        }

        let breaker = &self.dispatch.breaker;
        if !(breaker.failure_threshold > 0.0 && breaker.failure_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "failure_threshold",
                reason: format!("must be in (0, 1], got {}", breaker.failure_threshold),
            }
            .into());
        }
        if breaker.success_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "success_threshold",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if breaker.max_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_failures",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.dispatch.drain_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "drain_timeout_secs",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.numrot.token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "NUMROT_TOKEN_TTL",
                reason: "must be positive".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "si" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a boolean, got '{other}'"),
        }
        .into()),
    }
}
