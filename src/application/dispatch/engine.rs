//! Dispatch engine.
//!
//! ```text
//!   DocumentBatch
//!        │ into_selected()
//!        ▼
//!   work channel ──► worker 1..W ──► rate ─► slot ─► breaker{token, transform, POST}
//!                                                          │
//!   drain (input order) ◄── result channel ◄── reconcile ◄─┘
//! ```
//!
//! Every input document yields exactly one outcome. Documents that never
//! report back before the drain stops (cancellation or the wall-clock cap)
//! are recorded as incomplete.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use super::{MSG_BREAKER_OPEN, MSG_EMPTY_RESPONSE, MSG_INCOMPLETE};
use crate::adapter::outbound::numrot::{endpoint, reconcile, AuthManager, Reconciled, Transformer};
use crate::application::flow::{
    BreakerSettings, BreakerStats, CallError, CircuitBreaker, ConcurrencyLimiter, LimiterStats,
    RateLimiter,
};
use crate::domain::{BatchResponse, Document, DocumentBatch, DocumentKind, DocumentOutcome, Nit};
use crate::error::{Error, Result, UpstreamError};
use crate::infrastructure::config::dispatch::DispatchConfig;
use crate::infrastructure::config::numrot::NumrotConfig;
use crate::port::{HttpMethod, HttpReply, HttpRequest, HttpTransport};

/// Worker count when the concurrency limiter is disabled.
const DEFAULT_WORKERS: usize = 10;

type WorkQueue = Arc<Mutex<mpsc::Receiver<(usize, Document)>>>;

/// Diagnostic snapshot of the flow-control gates.
#[derive(Debug, Clone, Copy)]
pub struct EngineStats {
    /// `None` when the concurrency limiter is disabled.
    pub limiter: Option<LimiterStats>,
    /// Rate tokens currently available; `None` when rate limiting is off.
    pub rate_available: Option<usize>,
    pub breaker: Option<BreakerStats>,
}

/// Result of one document plus the batch id a legacy reply may carry.
struct Dispatched {
    outcome: DocumentOutcome,
    lote: Option<String>,
}

impl Dispatched {
    fn failed(kind: DocumentKind, document: &Document, error: impl Into<String>) -> Self {
        Self {
            outcome: DocumentOutcome::failed(kind, document, error),
            lote: None,
        }
    }
}

/// Fans a batch out to the upstream, one call per document.
#[derive(Clone)]
pub struct DispatchEngine {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<AuthManager>,
    transformer: Transformer,
    send_url: String,
    ds_base_url: String,
    config: DispatchConfig,
    limiter: Option<ConcurrencyLimiter>,
    rate: Option<RateLimiter>,
    breaker: Option<CircuitBreaker>,
}

impl DispatchEngine {
    /// Build an engine; each flow-control gate is created only when enabled.
    ///
    /// Must be called inside a Tokio runtime when rate limiting is on.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: Arc<AuthManager>,
        transformer: Transformer,
        numrot: &NumrotConfig,
        config: DispatchConfig,
    ) -> Self {
        let limiter = config.concurrency_limit().map(ConcurrencyLimiter::new);
        let rate = (config.rate_limit_rps > 0).then(|| RateLimiter::new(config.rate_limit_rps));
        let breaker = config
            .breaker
            .enabled
            .then(|| CircuitBreaker::new(BreakerSettings::from(&config.breaker)));

        info!(
            max_concurrent = limiter.as_ref().map(ConcurrencyLimiter::capacity),
            rate_limit_rps = config.rate_limit_rps,
            breaker = breaker.is_some(),
            "Dispatch engine ready"
        );

        Self {
            inner: Arc::new(Inner {
                transport,
                auth,
                transformer,
                send_url: endpoint::join(&numrot.base_url, endpoint::SEND_PATH),
                ds_base_url: numrot.ds_base_url().to_string(),
                config,
                limiter,
                rate,
                breaker,
            }),
        }
    }

    /// Submit every document of the batch's selected kind.
    ///
    /// Per-document failures never abort the batch: the reply always holds
    /// one outcome per input document, in input order.
    ///
    /// # Errors
    ///
    /// [`Error::NoDocuments`] for an empty batch and
    /// [`Error::BatchTooLarge`] when it exceeds the configured size.
    pub async fn register_document(
        &self,
        batch: DocumentBatch,
        cancel: &CancellationToken,
    ) -> Result<BatchResponse> {
        let Some((kind, documents)) = batch.into_selected() else {
            return Err(Error::NoDocuments);
        };
        let limit = self.inner.config.batch_size;
        if limit > 0 && documents.len() > limit {
            return Err(Error::BatchTooLarge {
                size: documents.len(),
                limit,
            });
        }

        let batch_id = Uuid::new_v4();
        let span = info_span!("dispatch_batch", %batch_id, %kind, documents = documents.len());
        Ok(self.dispatch(kind, documents, cancel).instrument(span).await)
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            limiter: self.inner.limiter.as_ref().map(ConcurrencyLimiter::stats),
            rate_available: self.inner.rate.as_ref().map(RateLimiter::available),
            breaker: self.inner.breaker.as_ref().map(CircuitBreaker::stats),
        }
    }

    /// Stop the rate limiter's refill task. Later submissions fail fast.
    pub fn shutdown(&self) {
        if let Some(rate) = &self.inner.rate {
            rate.close();
        }
    }

    async fn dispatch(
        &self,
        kind: DocumentKind,
        documents: Vec<Document>,
        cancel: &CancellationToken,
    ) -> BatchResponse {
        let started = Instant::now();
        let slots = if let [document] = documents.as_slice() {
            vec![self.run_single(kind, document, cancel).await]
        } else {
            self.run_pool(kind, &documents, cancel).await
        };

        let mut lote = None;
        let outcomes: Vec<DocumentOutcome> = documents
            .iter()
            .zip(slots)
            .map(|(document, slot)| match slot {
                Some(dispatched) => {
                    if lote.is_none() {
                        lote = dispatched.lote;
                    }
                    dispatched.outcome
                }
                None => DocumentOutcome::failed(kind, document, MSG_INCOMPLETE),
            })
            .collect();

        let response = BatchResponse::from_outcomes(outcomes, lote);
        info!(
            processed = response.documentos_procesados.len(),
            failed = response.documentos_fallidos.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            peak_active = self.inner.limiter.as_ref().map(|l| l.stats().peak_active),
            "Batch dispatched"
        );
        response
    }

    async fn run_single(
        &self,
        kind: DocumentKind,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Option<Dispatched> {
        let drain_timeout = self.inner.config.drain_timeout();
        tokio::select! {
            biased;
            dispatched = self.inner.process_guarded(kind, document, cancel) => Some(dispatched),
            () = tokio::time::sleep(drain_timeout) => {
                warn!(timeout_secs = drain_timeout.as_secs(), "Drain timeout reached");
                None
            }
        }
    }

    async fn run_pool(
        &self,
        kind: DocumentKind,
        documents: &[Document],
        cancel: &CancellationToken,
    ) -> Vec<Option<Dispatched>> {
        let total = documents.len();
        let workers = self
            .inner
            .config
            .concurrency_limit()
            .unwrap_or(DEFAULT_WORKERS)
            .min(total);

        let (work_tx, work_rx) = mpsc::channel(total);
        for pair in documents.iter().cloned().enumerate() {
            // Capacity equals the batch size.
            if work_tx.try_send(pair).is_err() {
                break;
            }
        }
        drop(work_tx);
        let work: WorkQueue = Arc::new(Mutex::new(work_rx));

        let batch_cancel = cancel.child_token();
        let (result_tx, mut result_rx) = mpsc::channel(total);
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                tokio::spawn(
                    run_worker(
                        worker,
                        Arc::clone(&self.inner),
                        kind,
                        Arc::clone(&work),
                        result_tx.clone(),
                        batch_cancel.clone(),
                    )
                    .instrument(Span::current()),
                )
            })
            .collect();
        drop(result_tx);
        debug!(workers, "Workers started");

        let drain_timeout = self.inner.config.drain_timeout();
        let deadline = tokio::time::sleep(drain_timeout);
        tokio::pin!(deadline);

        let mut slots: Vec<Option<Dispatched>> = (0..total).map(|_| None).collect();
        let mut received = 0usize;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    warn!(received, total, "Batch cancelled while draining");
                    break;
                }
                () = &mut deadline => {
                    warn!(received, total, timeout_secs = drain_timeout.as_secs(), "Drain timeout reached");
                    break;
                }
                next = result_rx.recv() => match next {
                    Some((index, dispatched)) => {
                        if let Some(slot) = slots.get_mut(index) {
                            *slot = Some(dispatched);
                            received += 1;
                        }
                    }
                    None => break,
                },
            }
        }

        batch_cancel.cancel();
        for handle in handles {
            handle.abort();
        }
        slots
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("send_url", &self.inner.send_url)
            .field("ds_base_url", &self.inner.ds_base_url)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

async fn run_worker(
    worker: usize,
    inner: Arc<Inner>,
    kind: DocumentKind,
    work: WorkQueue,
    results: mpsc::Sender<(usize, Dispatched)>,
    cancel: CancellationToken,
) {
    let mut handled = 0usize;
    loop {
        let next = work.lock().await.recv().await;
        let Some((index, document)) = next else {
            break;
        };
        let dispatched = inner.process_guarded(kind, &document, &cancel).await;
        handled += 1;
        if results.send((index, dispatched)).await.is_err() {
            debug!(worker, "Result channel closed");
            break;
        }
    }
    debug!(worker, handled, "Worker finished");
}

impl Inner {
    /// [`Self::process`], with a panic turned into a failed outcome.
    async fn process_guarded(
        &self,
        kind: DocumentKind,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Dispatched {
        match AssertUnwindSafe(self.process(kind, document, cancel))
            .catch_unwind()
            .await
        {
            Ok(dispatched) => dispatched,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(
                    prefix = %document.prefix,
                    consecutive = %document.consecutive,
                    panic = %message,
                    "Document processing panicked"
                );
                Dispatched::failed(kind, document, format!("internal error: {message}"))
            }
        }
    }

    async fn process(
        &self,
        kind: DocumentKind,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Dispatched {
        if let Some(rate) = &self.rate {
            if let Err(err) = rate.acquire(cancel).await {
                return Dispatched::failed(kind, document, format!("rate limiter: {err}"));
            }
        }

        // Released when this document is done, not when the worker exits.
        let _permit = match &self.limiter {
            Some(limiter) => match limiter.acquire(cancel).await {
                Ok(permit) => Some(permit),
                Err(err) => {
                    return Dispatched::failed(kind, document, format!("concurrency limiter: {err}"))
                }
            },
            None => None,
        };

        let submit = || self.submit(kind, document, cancel);
        let result = match &self.breaker {
            Some(breaker) => breaker.execute(submit).await,
            None => submit().await.map_err(CallError::Inner),
        };

        match result {
            Ok(reconciled) => settle(kind, document, reconciled),
            Err(CallError::Open) => {
                debug!(prefix = %document.prefix, consecutive = %document.consecutive, "Rejected by open breaker");
                Dispatched::failed(kind, document, MSG_BREAKER_OPEN)
            }
            Err(CallError::Inner(err)) => {
                warn!(
                    prefix = %document.prefix,
                    consecutive = %document.consecutive,
                    error = %err,
                    "Document submission failed"
                );
                Dispatched::failed(kind, document, err.to_string())
            }
        }
    }

    async fn submit(
        &self,
        kind: DocumentKind,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<Reconciled> {
        let token = self.auth.token().await?;
        let body = self.transformer.to_json(kind, document)?;
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.submission_url(kind, document),
            bearer: Some(token),
            body: Some(body),
        };

        let reply = self.send_with_retry(&request, cancel).await?;
        match reply.status {
            200 => {
                debug!(
                    prefix = %document.prefix,
                    consecutive = %document.consecutive,
                    bytes = reply.body.len(),
                    "Upstream accepted the call"
                );
                Ok(reconcile(kind, std::slice::from_ref(document), &reply.body)?)
            }
            401 => {
                self.auth.clear_token();
                warn!("Upstream rejected the bearer token");
                Err(UpstreamError::Unauthorized.into())
            }
            status => Err(UpstreamError::Status {
                status,
                body: reply.text(),
            }
            .into()),
        }
    }

    fn submission_url(&self, kind: DocumentKind, document: &Document) -> String {
        if kind == DocumentKind::SupportDocument {
            endpoint::support_document(&self.ds_base_url, &Nit::parse(&document.issuer.nit), document)
        } else {
            self.send_url.clone()
        }
    }

    /// Send `request`, retrying timeouts only, with doubling delays.
    async fn send_with_retry(
        &self,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> std::result::Result<HttpReply, UpstreamError> {
        let max_retries = self.config.max_retries;
        let mut backoff = self.config.retry_initial_backoff();
        let mut attempt = 1u32;
        loop {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(UpstreamError::Cancelled),
                result = self.transport.send(request.clone()) => result,
            };

            match result {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_timeout() && attempt <= max_retries => {
                    warn!(
                        attempt,
                        max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Submission timed out, retrying"
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(UpstreamError::Cancelled),
                        () = tokio::time::sleep(backoff) => {}
                    }
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Keep the outcome that belongs to `document`, labelled with its identity.
fn settle(kind: DocumentKind, document: &Document, reconciled: Reconciled) -> Dispatched {
    let Reconciled { mut outcomes, lote } = reconciled;
    if outcomes.is_empty() {
        return Dispatched::failed(kind, document, MSG_EMPTY_RESPONSE);
    }
    if outcomes.len() > 1 {
        debug!(outcomes = outcomes.len(), "Reply described more than one document");
    }

    let position = outcomes
        .iter()
        .position(|outcome| outcome.matches(document))
        .unwrap_or(0);
    let mut outcome = outcomes.swap_remove(position);
    match &mut outcome {
        DocumentOutcome::Succeeded(doc) => {
            doc.prefix.clone_from(&document.prefix);
            doc.consecutive.clone_from(&document.consecutive);
        }
        DocumentOutcome::Failed(doc) => {
            doc.prefix.clone_from(&document.prefix);
            doc.consecutive.clone_from(&document.consecutive);
        }
    }
    Dispatched { outcome, lote }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
