mod support;

use std::sync::Arc;
use std::time::Duration;

use numrot_gateway::application::dispatch::MSG_BREAKER_OPEN;
use numrot_gateway::application::flow::BreakerState;
use numrot_gateway::domain::outcome::MSG_ALL_OK;
use numrot_gateway::domain::DocumentKind;
use numrot_gateway::port::HttpReply;
use numrot_gateway::testkit::document;
use numrot_gateway::testkit::transport::ScriptedTransport;
use support::engine::{dispatch, engine, without_breaker};
use support::replies::accept_all;
use tokio::time::Instant;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

fn batch(count: u32) -> numrot_gateway::domain::DocumentBatch {
    document::batch(DocumentKind::Invoice, document::invoices("SETT", 1, count))
}

#[tokio::test(start_paused = true)]
async fn rate_limit_spaces_out_submissions() {
    let transport = Arc::new(ScriptedTransport::new().with_token("tok").with_route(accept_all));
    let mut config = dispatch(6);
    config.rate_limit_rps = 2;
    let engine = engine(&transport, config);
    assert_eq!(engine.stats().rate_available, Some(2));

    let started = Instant::now();
    let reply = engine
        .register_document(batch(6), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(reply.message, MSG_ALL_OK);
    assert!(started.elapsed() >= Duration::from_millis(1500));
    engine.shutdown();
}

#[tokio::test(start_paused = true)]
async fn single_slot_serializes_calls() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_token("tok")
            .with_latency(Duration::from_millis(500))
            .with_route(accept_all),
    );
    let engine = engine(&transport, without_breaker(dispatch(1)));

    let started = Instant::now();
    let reply = engine
        .register_document(batch(4), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(reply.documentos_procesados.len(), 4);
    assert_eq!(transport.peak_in_flight(), 1);
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn open_breaker_recovers_after_cooldown() {
    let transport = Arc::new(ScriptedTransport::new().with_token("tok").with_route(accept_all));
    transport.push_reply(HttpReply::new(503, "unavailable"));

    let mut config = dispatch(1);
    config.breaker.cooldown_secs = 30;
    config.breaker.success_threshold = 1;
    let engine = engine(&transport, config);

    let first = engine
        .register_document(batch(3), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.documentos_fallidos.len(), 3);
    assert!(first.documentos_fallidos[0].errors[0].contains("status 503"));
    assert_eq!(first.documentos_fallidos[2].errors, vec![MSG_BREAKER_OPEN.to_string()]);
    assert_eq!(engine.stats().breaker.unwrap().state, BreakerState::Open);

    let still_open = engine
        .register_document(batch(1), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(still_open.documentos_fallidos[0].errors, vec![MSG_BREAKER_OPEN.to_string()]);

    tokio::time::advance(Duration::from_secs(31)).await;

    let probe = engine
        .register_document(batch(1), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(probe.message, MSG_ALL_OK);
    assert_eq!(engine.stats().breaker.unwrap().state, BreakerState::Closed);
    assert_eq!(transport.document_requests().len(), 2);
}

#[tokio::test]
async fn submissions_after_shutdown_fail_fast() {
    let transport = Arc::new(ScriptedTransport::new().with_token("tok").with_route(accept_all));
    let mut config = dispatch(2);
    config.rate_limit_rps = 5;
    let engine = engine(&transport, config);
    engine.shutdown();

    let reply = engine
        .register_document(batch(2), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(reply.documentos_fallidos.len(), 2);
    assert!(reply
        .documentos_fallidos
        .iter()
        .all(|f| f.errors[0].starts_with("rate limiter:")));
    assert!(transport.document_requests().is_empty());
}

#[tokio::test]
async fn limiter_is_idle_after_a_batch() {
    let transport = Arc::new(ScriptedTransport::new().with_token("tok").with_route(accept_all));
    let engine = engine(&transport, dispatch(3));

    assert_ok!(
        engine
            .register_document(batch(7), &CancellationToken::new())
            .await
    );

    let limiter = engine.stats().limiter.unwrap();
    assert_eq!(limiter.capacity, 3);
    assert_eq!(limiter.active, 0);
    assert_eq!(limiter.total_acquired, 7);
    assert!(limiter.peak_active <= 3);
}
