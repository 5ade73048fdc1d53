//! `token`, `resolutions`, `info` and `search`.

use serde_json::json;

use super::command::{InfoArgs, NitArg, SearchArgs};
use super::output;
use crate::domain::Nit;
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap::Gateway;
use crate::infrastructure::config::Config;

/// Base NIT from the argument, else from the configured issuer.
fn resolve_nit(config: &Config, arg: &NitArg) -> Result<String> {
    let nit = Nit::parse(arg.nit.as_deref().unwrap_or(&config.issuer.nit));
    if nit.is_empty() {
        return Err(ConfigError::MissingField {
            field: "NUMROT_EMISOR_NIT",
        }
        .into());
    }
    Ok(nit.base().to_string())
}

/// Acquire a token; only its length and lifetime are printed.
pub async fn execute_token(config: &Config) -> Result<()> {
    let gateway = Gateway::from_config(config, None);
    let token = gateway.auth.token().await?;
    output::json(&json!({
        "token_length": token.len(),
        "expires_in_secs": config.numrot.token_ttl_secs,
    }))
}

pub async fn execute_resolutions(config: &Config, args: &NitArg) -> Result<()> {
    let nit = resolve_nit(config, args)?;
    let gateway = Gateway::from_config(config, None);
    output::json(&gateway.queries.list_resolutions(&nit).await?)
}

pub async fn execute_info(config: &Config, args: &InfoArgs) -> Result<()> {
    let nit = resolve_nit(config, &args.nit)?;
    let gateway = Gateway::from_config(config, None);
    output::json(&gateway.queries.document_info(&nit, args.cufe.trim()).await?)
}

pub async fn execute_search(config: &Config, args: &SearchArgs) -> Result<()> {
    let nit = resolve_nit(config, &args.nit)?;
    let gateway = Gateway::from_config(config, None);
    output::json(&gateway.queries.search_states(&nit, args.number.trim()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn nit_argument_wins_and_loses_its_check_digit() {
        let mut config = Config::default();
        config.issuer.nit = "860011153-6".into();
        let arg = NitArg {
            nit: Some("900123456-7".into()),
        };
        assert_eq!(resolve_nit(&config, &arg).unwrap(), "900123456");
        assert_eq!(resolve_nit(&config, &NitArg { nit: None }).unwrap(), "860011153");
    }

    #[test]
    fn missing_nit_is_a_config_error() {
        let err = resolve_nit(&Config::default(), &NitArg { nit: None }).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingField { .. })));
    }
}
