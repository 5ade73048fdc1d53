//! Mock [`HttpTransport`] for testing.
//!
//! [`ScriptedTransport`] answers from a FIFO script, falls back to an
//! optional routing closure and records every request it sees. With
//! [`ScriptedTransport::with_token`] token requests are answered
//! automatically and never consume the script, which keeps document
//! scripts independent of token caching.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::adapter::outbound::numrot::endpoint::TOKEN_PATH;
use crate::port::{HttpReply, HttpRequest, HttpTransport, TransportError};

type Route = dyn Fn(&HttpRequest) -> Result<HttpReply, TransportError> + Send + Sync;

struct Step {
    result: Result<HttpReply, TransportError>,
    delay: Option<Duration>,
}

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// A transport with scripted replies.
///
/// Each call to `send()` pops the next scripted step. When the script is
/// empty the route closure answers; without one the call fails with
/// [`TransportError::Other`].
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    route: Option<Box<Route>>,
    token: Option<String>,
    latency: Duration,
    requests: Mutex<Vec<HttpRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            route: None,
            token: None,
            latency: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answer every token request with `200 token`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Answer unscripted requests with `route`.
    pub fn with_route<F>(mut self, route: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpReply, TransportError> + Send + Sync + 'static,
    {
        self.route = Some(Box::new(route));
        self
    }

    /// Sleep this long (tokio time) before answering non-token requests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_reply(&self, reply: HttpReply) {
        self.push(Ok(reply), None);
    }

    pub fn push_error(&self, error: TransportError) {
        self.push(Err(error), None);
    }

    /// Scripted reply delivered after `delay`.
    pub fn push_delayed(&self, reply: HttpReply, delay: Duration) {
        self.push(Ok(reply), Some(delay));
    }

    fn push(&self, result: Result<HttpReply, TransportError>, delay: Option<Duration>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Step { result, delay });
    }

    /// Every request seen so far, token requests included.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests other than token acquisition.
    pub fn document_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| !is_token_request(r))
            .collect()
    }

    pub fn token_request_count(&self) -> usize {
        self.requests().iter().filter(|r| is_token_request(r)).count()
    }

    /// Highest number of non-token requests observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Scripted steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn is_token_request(request: &HttpRequest) -> bool {
    request.url.ends_with(TOKEN_PATH)
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        if is_token_request(&request) {
            if let Some(token) = &self.token {
                return Ok(HttpReply::new(200, token.clone()));
            }
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        let step = self.script.lock().unwrap().pop_front();
        let (result, delay) = match step {
            Some(step) => (step.result, step.delay),
            None => match &self.route {
                Some(route) => (route(&request), None),
                None => (
                    Err(TransportError::Other(format!(
                        "no scripted reply for {}",
                        request.url
                    ))),
                    None,
                ),
            },
        };

        let wait = delay.unwrap_or(self.latency);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        result
    }
}
