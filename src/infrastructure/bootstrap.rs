//! Composition root: builds the upstream clients and the dispatch engine
//! from configuration.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::memory::InMemoryCustomers;
use crate::adapter::outbound::numrot::{
    AuthManager, QueryClient, RadianClient, ReqwestTransport, TransformSettings, Transformer,
};
use crate::application::dispatch::DispatchEngine;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::{CustomerDirectory, HttpTransport};

/// Load the customer directory at `path`, if one was given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds invalid records.
pub fn load_customers(path: Option<&Path>) -> Result<Option<Arc<dyn CustomerDirectory>>> {
    path.map(|path| {
        InMemoryCustomers::load(path).map(|directory| Arc::new(directory) as Arc<dyn CustomerDirectory>)
    })
    .transpose()
}

pub(crate) fn build_transformer(
    config: &Config,
    customers: Option<Arc<dyn CustomerDirectory>>,
) -> Transformer {
    let transformer = Transformer::new(TransformSettings::from_config(config));
    match customers {
        Some(directory) => transformer.with_customers(directory),
        None => transformer,
    }
}

/// Everything the operator surface talks to, sharing one transport and one
/// token cache.
#[derive(Debug, Clone)]
pub struct Gateway {
    pub auth: Arc<AuthManager>,
    pub engine: DispatchEngine,
    pub queries: Arc<QueryClient>,
    pub radian: Arc<RadianClient>,
    pub transformer: Transformer,
}

impl Gateway {
    /// Wire the gateway over the reqwest transport.
    ///
    /// Must run inside a Tokio runtime (the rate limiter spawns its refill
    /// task).
    #[must_use]
    pub fn from_config(config: &Config, customers: Option<Arc<dyn CustomerDirectory>>) -> Self {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::from_config(&config.numrot.http));
        Self::with_transport(config, transport, customers)
    }

    /// Wire the gateway over an arbitrary transport.
    #[must_use]
    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        customers: Option<Arc<dyn CustomerDirectory>>,
    ) -> Self {
        let auth = Arc::new(AuthManager::from_config(Arc::clone(&transport), &config.numrot));
        let transformer = build_transformer(config, customers);
        let engine = DispatchEngine::new(
            Arc::clone(&transport),
            Arc::clone(&auth),
            transformer.clone(),
            &config.numrot,
            config.dispatch.clone(),
        );
        let queries = Arc::new(QueryClient::new(
            Arc::clone(&transport),
            Arc::clone(&auth),
            config.numrot.base_url.clone(),
        ));
        let radian = Arc::new(RadianClient::new(transport, &config.numrot, &config.issuer));

        info!(
            base_url = %config.numrot.base_url,
            environment = %config.numrot.environment,
            "Gateway wired"
        );

        Self {
            auth,
            engine,
            queries,
            radian,
            transformer,
        }
    }
}
