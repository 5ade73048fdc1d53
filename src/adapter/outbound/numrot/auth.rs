//! Bearer token acquisition.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::endpoint;
use super::token::TokenCache;
use crate::error::UpstreamError;
use crate::infrastructure::config::numrot::NumrotConfig;
use crate::port::{HttpRequest, HttpTransport};

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Obtains bearer tokens and keeps the current one cached.
///
/// Reads go through the cache without blocking each other. A miss takes the
/// refresh lock and probes the cache again, so concurrent misses produce a
/// single token request.
pub struct AuthManager {
    transport: Arc<dyn HttpTransport>,
    token_url: String,
    username: String,
    password: String,
    ttl: Duration,
    cache: TokenCache,
    refresh: Mutex<()>,
}

impl AuthManager {
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            transport,
            token_url: endpoint::token(base_url),
            username: username.into(),
            password: password.into(),
            ttl,
            cache: TokenCache::new(),
            refresh: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &NumrotConfig) -> Self {
        Self::new(
            transport,
            &config.base_url,
            config.username.clone(),
            config.password.clone(),
            Duration::from_secs(config.token_ttl_secs),
        )
    }

    /// A fresh token, from the cache or from the upstream.
    ///
    /// # Errors
    ///
    /// [`UpstreamError::AuthFailed`] when the upstream refuses the credentials
    /// or answers with an empty body; [`UpstreamError::Transport`] when the
    /// exchange itself fails.
    pub async fn token(&self) -> Result<String, UpstreamError> {
        if let Some(token) = self.cache.get() {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        if let Some(token) = self.cache.get() {
            debug!("Token refreshed by a concurrent caller");
            return Ok(token);
        }

        let token = self.request_token().await?;
        self.cache.set(token.clone(), self.ttl);
        info!(ttl_secs = self.ttl.as_secs(), "Acquired upstream token");
        Ok(token)
    }

    /// Drop the cached token so the next call fetches a new one.
    pub fn clear_token(&self) {
        self.cache.clear();
        debug!("Cleared cached upstream token");
    }

    /// True when a usable token is cached.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.cache.is_expired()
    }

    async fn request_token(&self) -> Result<String, UpstreamError> {
        let request = HttpRequest::post_json(
            self.token_url.clone(),
            &Credentials {
                username: &self.username,
                password: &self.password,
            },
        )
        .map_err(|e| UpstreamError::AuthFailed(e.to_string()))?;

        let reply = self.transport.send(request).await?;
        let body = reply.text();
        if !reply.is_ok() {
            warn!(status = reply.status, "Token request rejected");
            return Err(UpstreamError::AuthFailed(format!(
                "status {}: {}",
                reply.status,
                body.trim()
            )));
        }

        let token = body.trim().trim_matches('"').to_string();
        if token.is_empty() {
            return Err(UpstreamError::AuthFailed("empty token in response".into()));
        }
        Ok(token)
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_url", &self.token_url)
            .field("username", &self.username)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::HttpReply;
    use crate::testkit::transport::ScriptedTransport;

    fn manager(transport: Arc<ScriptedTransport>) -> AuthManager {
        AuthManager::new(
            transport,
            "https://numrot.test",
            "user",
            "secret",
            Duration::from_secs(3300),
        )
    }

    #[tokio::test]
    async fn caches_token_across_calls() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(200, "  tok-1 \n"));
        let auth = manager(Arc::clone(&transport));

        assert_eq!(auth.token().await.unwrap(), "tok-1");
        assert_eq!(auth.token().await.unwrap(), "tok-1");
        assert_eq!(transport.request_count(), 1);

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "https://numrot.test/v2/api/Token");
        let body = sent.json_body().unwrap();
        assert_eq!(body["username"], "user");
        assert_eq!(body["password"], "secret");
    }

    #[tokio::test]
    async fn clear_forces_refresh() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(200, "a"));
        transport.push_reply(HttpReply::new(200, "b"));
        let auth = manager(Arc::clone(&transport));

        assert_eq!(auth.token().await.unwrap(), "a");
        auth.clear_token();
        assert!(!auth.has_token());
        assert_eq!(auth.token().await.unwrap(), "b");
    }

    #[tokio::test]
    async fn non_200_is_auth_failure_with_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(401, "bad credentials"));
        let auth = manager(transport);

        let err = auth.token().await.unwrap_err();
        assert!(matches!(&err, UpstreamError::AuthFailed(msg) if msg.contains("bad credentials")));
    }

    #[tokio::test]
    async fn empty_body_is_auth_failure() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(200, "   "));
        let auth = manager(transport);
        assert!(matches!(
            auth.token().await,
            Err(UpstreamError::AuthFailed(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_refresh() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_reply(HttpReply::new(200, "shared"));
        let auth = Arc::new(manager(Arc::clone(&transport)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let auth = Arc::clone(&auth);
                tokio::spawn(async move { auth.token().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "shared");
        }
        assert_eq!(transport.request_count(), 1);
    }
}
