use std::sync::Arc;
use std::time::Duration;

use numrot_gateway::adapter::outbound::numrot::{AuthManager, TransformSettings, Transformer};
use numrot_gateway::application::dispatch::DispatchEngine;
use numrot_gateway::infrastructure::config::dispatch::{BreakerConfig, DispatchConfig};
use numrot_gateway::infrastructure::config::numrot::NumrotConfig;
use numrot_gateway::port::HttpTransport;
use numrot_gateway::testkit::transport::ScriptedTransport;

pub const BASE_URL: &str = "https://numrot.test";
pub const DS_BASE_URL: &str = "https://ds.numrot.test/api";

pub fn numrot() -> NumrotConfig {
    NumrotConfig {
        base_url: BASE_URL.into(),
        ds_base_url: Some(DS_BASE_URL.into()),
        username: "user".into(),
        password: "secret".into(),
        ..Default::default()
    }
}

/// No rate limiting, `max_concurrent` slots, breaker left at its defaults.
pub fn dispatch(max_concurrent: usize) -> DispatchConfig {
    DispatchConfig {
        max_concurrent,
        rate_limit_rps: 0,
        ..Default::default()
    }
}

pub fn without_breaker(mut config: DispatchConfig) -> DispatchConfig {
    config.breaker = BreakerConfig {
        enabled: false,
        ..Default::default()
    };
    config
}

pub fn engine(transport: &Arc<ScriptedTransport>, config: DispatchConfig) -> DispatchEngine {
    let numrot = numrot();
    let transport = Arc::clone(transport) as Arc<dyn HttpTransport>;
    let auth = Arc::new(AuthManager::new(
        Arc::clone(&transport),
        &numrot.base_url,
        numrot.username.clone(),
        numrot.password.clone(),
        Duration::from_secs(3300),
    ));
    DispatchEngine::new(
        transport,
        auth,
        Transformer::new(TransformSettings::default()),
        &numrot,
        config,
    )
}
