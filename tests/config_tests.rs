use std::io::Write;

use numrot_gateway::error::{ConfigError, Error};
use numrot_gateway::infrastructure::config::numrot::Environment;
use numrot_gateway::infrastructure::config::Config;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
[numrot]
base_url = "https://numrot.test"
ds_base_url = "https://ds.numrot.test/api"
username = "gateway"
password = "secret"
token_ttl_secs = 1800
environment = "production"

[numrot.http]
timeout_ms = 30000

[dispatch]
max_concurrent = 4
batch_size = 50
rate_limit_rps = 3
drain_timeout_secs = 120

[dispatch.breaker]
max_failures = 5
cooldown_secs = 10
success_threshold = 2

[issuer]
nit = "860011153-6"
name = "Positiva Compañía de Seguros"

[resolution]
disabled = true
authorization = "18764000009"
prefix = "FEPO"

[credit_note_period]
start_date = "2024-05-01"
end_date = "2024-05-31"

[logging]
level = "debug"
format = "json"
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn from_toml(content: &str) -> Config {
    toml::from_str(content).unwrap()
}

#[test]
fn file_values_are_loaded() {
    let file = write_config(FULL_CONFIG);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.numrot.ds_base_url(), "https://ds.numrot.test/api");
    assert_eq!(config.numrot.http.timeout_ms, 30_000);
    assert_eq!(config.numrot.http.connect_timeout_ms, 10_000);
    assert_eq!(config.dispatch.breaker.max_failures, 5);
    assert_eq!(config.dispatch.breaker.cooldown_secs, 10);
    assert!(config.dispatch.breaker.enabled);
    assert!(config.credit_note_period.is_complete());
}

#[test]
fn defaults_fill_missing_sections() {
    let config = from_toml("[numrot]\nbase_url = \"https://numrot.test\"\n");
    config.validate().unwrap();

    assert_eq!(config.numrot.ds_base_url(), "https://numrot.test");
    assert_eq!(config.numrot.token_ttl_secs, 3300);
    assert_eq!(config.numrot.environment, Environment::Test);
    assert_eq!(config.dispatch.max_concurrent, 10);
    assert_eq!(config.dispatch.batch_size, 500);
    assert_eq!(config.dispatch.rate_limit_rps, 10);
    assert_eq!(config.dispatch.drain_timeout_secs, 600);
    assert_eq!(config.dispatch.max_retries, 3);
    assert_eq!(config.dispatch.breaker.success_threshold, 3);
    assert_eq!(config.issuer.name, "Positiva");
    assert_eq!(config.issuer.utc_offset, "-05:00");
    assert!(!config.resolution.disabled);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn environment_overrides_the_file() {
    let mut config = from_toml(FULL_CONFIG);
    config
        .apply_env_with(|key| match key {
            "NUMROT_PASSWORD" => Some("from-env".into()),
            "NUMROT_ENVIRONMENT" => Some("pruebas".into()),
            "NUMROT_BATCH_SIZE" => Some("0".into()),
            "RES_DISABLED" => Some("false".into()),
            "RES_PREFIX" => Some(" SETP ".into()),
            "LOG_LEVEL" => Some(String::new()),
            _ => None,
        })
        .unwrap();

    assert_eq!(config.numrot.password, "from-env");
    assert_eq!(config.numrot.username, "gateway");
    assert_eq!(config.numrot.environment, Environment::Test);
    assert_eq!(config.dispatch.batch_size, 0);
    assert!(!config.resolution.disabled);
    assert_eq!(config.resolution.prefix, "SETP");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn unknown_environment_is_rejected() {
    let mut config = from_toml(FULL_CONFIG);
    let err = config
        .apply_env_with(|key| (key == "NUMROT_ENVIRONMENT").then(|| "staging".into()))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "NUMROT_ENVIRONMENT",
            ..
        })
    ));
}

#[test]
fn invalid_urls_fail_validation() {
    let mut config = from_toml(FULL_CONFIG);
    config.numrot.ds_base_url = Some("not a url".into());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("NUMROT_DS_BASE_URL"));

    config.numrot.ds_base_url = None;
    config.numrot.base_url = "numrot.test".into();
    assert!(config.validate().is_err());
}

#[test]
fn zero_drain_timeout_fails_validation() {
    let mut config = from_toml(FULL_CONFIG);
    config.dispatch.drain_timeout_secs = 0;
    assert!(config.validate().unwrap_err().to_string().contains("drain_timeout_secs"));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = Config::load("/definitely/not/here/config.toml").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
    assert_eq!(err.http_status(), 500);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let file = write_config("[dispatch\nmax_concurrent = ");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}
