//! End-to-end session flows against the nullable provider:
//! begin → URL → provider outcome → normalization.

use std::sync::{Arc, Mutex};

use serde_json::json;
use soundgraph_nullables::{NullIdentifiers, NullProvider, ProviderCall};
use soundgraph_proof::ProofNormalizer;
use soundgraph_session::{
    ProgressEvent, ProviderError, SessionError, SessionOrchestrator, SessionOutcome,
    SessionStatus,
};
use soundgraph_types::{RawProof, VerificationConfig};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config() -> VerificationConfig {
    VerificationConfig::new(
        "0xAc8348B8C077",
        "0xe9cd799b42e9",
        "c94476a0-8a75-4563",
        "https://portal.example.org/share",
        false,
    )
    .expect("valid config")
}

fn orchestrator(provider: &NullProvider) -> (SessionOrchestrator, Arc<Mutex<Vec<ProgressEvent>>>) {
    let orch = SessionOrchestrator::new(Arc::new(provider.clone()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    orch.on_progress(move |e| sink.lock().unwrap().push(e.clone()));
    (orch, events)
}

fn statuses(events: &Mutex<Vec<ProgressEvent>>) -> Vec<SessionStatus> {
    let mut out: Vec<SessionStatus> = Vec::new();
    for e in events.lock().unwrap().iter() {
        if out.last() != Some(&e.status) {
            out.push(e.status);
        }
    }
    out
}

fn sample_proof() -> RawProof {
    RawProof::new(json!({
        "identifier": "abc",
        "claimData": {"context": "{\"extractedParameters\":{\"totalArtists\":7}}"}
    }))
}

// ---------------------------------------------------------------------------
// Setup phase
// ---------------------------------------------------------------------------

#[tokio::test]
async fn begin_walks_states_in_order() {
    let provider = NullProvider::new();
    let (orch, events) = orchestrator(&provider);

    let handle = orch.begin(&config()).await.expect("session starts");

    assert_eq!(handle.status(), SessionStatus::AwaitingUserAction);
    assert_eq!(
        statuses(&events),
        vec![
            SessionStatus::Initializing,
            SessionStatus::AwaitingProviderUrl,
            SessionStatus::AwaitingUserAction,
        ]
    );
    let messages: Vec<String> = events.lock().unwrap().iter().map(|e| e.message.clone()).collect();
    assert_eq!(
        messages,
        vec![
            "Initializing proof provider...",
            "Starting verification session...",
            "Building verification request...",
            "Opening verification...",
        ]
    );
    assert_eq!(handle.status_message(), "Opening verification...");
}

#[tokio::test]
async fn callbacks_registered_before_url_requested() {
    let provider = NullProvider::new();
    let (orch, _events) = orchestrator(&provider);
    let _handle = orch.begin(&config()).await.unwrap();

    let calls = provider.calls();
    assert!(matches!(calls[0], ProviderCall::Init { .. }));
    assert_eq!(&calls[1..], &[ProviderCall::StartSession, ProviderCall::RequestUrl]);
}

#[tokio::test]
async fn init_receives_config_options() {
    let provider = NullProvider::new().expecting_secret("0xe9cd799b42e9");
    let (orch, _events) = orchestrator(&provider);
    let _handle = orch.begin(&config()).await.unwrap();

    assert_eq!(
        provider.calls()[0],
        ProviderCall::Init {
            application_id: "0xAc8348B8C077".into(),
            provider_id: "c94476a0-8a75-4563".into(),
            share_page_url: "https://portal.example.org/share".into(),
            use_embedded_flow: false,
            secret_accepted: true,
        }
    );
}

#[tokio::test]
async fn rejected_secret_fails_initialization() {
    let provider = NullProvider::new().expecting_secret("another-secret");
    let (orch, _events) = orchestrator(&provider);

    let err = orch.begin(&config()).await.unwrap_err();
    assert!(matches!(err, SessionError::ProviderInit(ProviderError::Rejected(_))));
}

#[tokio::test]
async fn init_failure_is_reported_synchronously() {
    let provider = NullProvider::new().failing_init(ProviderError::Network("offline".into()));
    let (orch, events) = orchestrator(&provider);

    let err = orch.begin(&config()).await.unwrap_err();
    assert!(matches!(err, SessionError::ProviderInit(ProviderError::Network(_))));
    assert!(err.is_init_phase());
    assert_eq!(
        statuses(&events),
        vec![SessionStatus::Initializing, SessionStatus::Failed]
    );
    let last = events.lock().unwrap().last().cloned().unwrap();
    assert!(last.message.starts_with("Failed to initialize: "));
    assert!(last.message.contains("offline"));
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn session_start_failure_skips_url_request() {
    let provider = NullProvider::new().failing_start(ProviderError::Rejected("quota".into()));
    let (orch, _events) = orchestrator(&provider);

    let err = orch.begin(&config()).await.unwrap_err();
    assert!(matches!(err, SessionError::SessionStart(_)));
    assert!(!provider.calls().contains(&ProviderCall::RequestUrl));
    assert!(provider.calls().contains(&ProviderCall::SessionDropped));
}

#[tokio::test]
async fn url_failure_closes_registered_sink() {
    let provider = NullProvider::new().failing_url(ProviderError::InvalidResponse("500".into()));
    let (orch, _events) = orchestrator(&provider);

    let err = orch.begin(&config()).await.unwrap_err();
    assert!(matches!(err, SessionError::RequestUrl(_)));
    assert!(!provider.sink_open());
    assert!(!provider.emit_success(vec![sample_proof()]));
}

#[tokio::test]
async fn empty_url_is_rejected() {
    let provider = NullProvider::new().with_url("   ");
    let (orch, _events) = orchestrator(&provider);
    let err = orch.begin(&config()).await.unwrap_err();
    assert!(matches!(err, SessionError::RequestUrl(ProviderError::InvalidResponse(_))));
}

// ---------------------------------------------------------------------------
// Outcome phase
// ---------------------------------------------------------------------------

#[tokio::test]
async fn outcome_emitted_during_start_is_not_lost() {
    let provider = NullProvider::new()
        .resolving_on_start(SessionOutcome::Succeeded(vec![sample_proof()]));
    let (orch, _events) = orchestrator(&provider);

    let mut handle = orch.begin(&config()).await.unwrap();
    assert_eq!(handle.status(), SessionStatus::AwaitingUserAction);

    let outcome = handle.outcome().await.unwrap();
    assert_eq!(outcome, SessionOutcome::Succeeded(vec![sample_proof()]));
    assert_eq!(handle.status(), SessionStatus::Succeeded);
}

#[tokio::test]
async fn end_to_end_success_normalizes_claims() {
    let provider = NullProvider::new().with_url("https://verify.example/s/42");
    let (orch, events) = orchestrator(&provider);

    let mut handle = orch.begin(&config()).await.unwrap();
    assert_eq!(handle.request_url(), Some("https://verify.example/s/42"));

    assert!(provider.emit_success(vec![sample_proof()]));
    let proofs = handle.outcome().await.unwrap().into_proofs().unwrap();

    assert_eq!(handle.status(), SessionStatus::Succeeded);
    assert_eq!(handle.request_url(), None);
    assert_eq!(statuses(&events).last(), Some(&SessionStatus::Succeeded));

    let normalizer = ProofNormalizer::with_generator(Box::new(NullIdentifiers::constant("0x0")));
    let snapshot = normalizer.normalize(proofs);
    assert_eq!(snapshot.identifier_hash(), "abc");
    assert_eq!(snapshot.attribute("totalArtists"), Some(&json!(7)));
}

#[tokio::test]
async fn provider_failure_arrives_as_outcome() {
    let provider = NullProvider::new();
    let (orch, events) = orchestrator(&provider);
    let mut handle = orch.begin(&config()).await.unwrap();

    assert!(provider.emit_failure("user closed the provider page"));
    let outcome = handle.outcome().await.unwrap();

    assert_eq!(outcome, SessionOutcome::Failed("user closed the provider page".into()));
    assert_eq!(handle.status(), SessionStatus::Failed);
    let last = events.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.message, "Verification failed: user closed the provider page");
}

#[tokio::test]
async fn only_first_outcome_is_delivered() {
    let provider = NullProvider::new();
    let (orch, _events) = orchestrator(&provider);
    let mut handle = orch.begin(&config()).await.unwrap();

    assert!(provider.emit_success(vec![sample_proof()]));
    assert!(!provider.emit_failure("late"));
    assert!(handle.outcome().await.unwrap().is_success());
    assert_eq!(handle.outcome().await, Err(SessionError::AlreadyResolved));
}

#[tokio::test]
async fn abandoned_sink_resolves_as_failure() {
    let provider = NullProvider::new();
    let (orch, _events) = orchestrator(&provider);
    let mut handle = orch.begin(&config()).await.unwrap();

    // The provider session itself holds no sink clone.
    provider.abandon();
    let outcome = handle.outcome().await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Failed(reason) if reason.contains("without an outcome")));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn outcome_after_discard_changes_nothing() {
    let provider = NullProvider::new();
    let (orch, events) = orchestrator(&provider);
    let handle = orch.begin(&config()).await.unwrap();
    let seen_before = events.lock().unwrap().len();

    handle.cancel();

    assert!(!provider.emit_failure("arrived after discard"));
    assert!(!provider.emit_failure("and again"));
    assert_eq!(events.lock().unwrap().len(), seen_before);
    assert!(provider.calls().contains(&ProviderCall::SessionDropped));
}

#[tokio::test]
async fn new_session_supersedes_previous_handle() {
    let provider = NullProvider::new();
    let (orch, _events) = orchestrator(&provider);

    let mut first = orch.begin(&config()).await.unwrap();
    let mut second = orch.begin(&config()).await.unwrap();
    assert!(second.generation() > first.generation());
    assert!(!first.is_active());
    assert!(second.is_active());

    assert_eq!(first.outcome().await, Err(SessionError::Cancelled));
    drop(first);
    assert!(second.is_active());

    assert!(provider.emit_success(vec![sample_proof()]));
    assert!(second.outcome().await.unwrap().is_success());
}

#[tokio::test]
async fn superseded_waiter_ignores_dropped_sink() {
    let provider = NullProvider::new();
    let (orch, events) = orchestrator(&provider);
    let first = orch.begin(&config()).await.unwrap();
    let first_generation = first.generation();

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let task = first.on_outcome(move |outcome| sink.lock().unwrap().push(outcome));
    tokio::task::yield_now().await;

    // Registering the new session replaces, and so drops, the first sink.
    let _second = orch.begin(&config()).await.unwrap();
    task.await.unwrap();

    assert!(received.lock().unwrap().is_empty());
    assert!(events
        .lock()
        .unwrap()
        .iter()
        .all(|e| e.generation != first_generation || e.status != SessionStatus::Failed));
}

#[tokio::test]
async fn superseded_waiter_ignores_stale_delivery() {
    let provider = NullProvider::new();
    let (orch, events) = orchestrator(&provider);
    let mut first = orch.begin(&config()).await.unwrap();
    let first_generation = first.generation();
    let stale = provider.registered_sink().unwrap();

    let waiter = tokio::spawn(async move { first.outcome().await });
    tokio::task::yield_now().await;

    let mut second = orch.begin(&config()).await.unwrap();
    assert!(!stale.fail("arrived after supersede"));
    assert_eq!(waiter.await.unwrap(), Err(SessionError::Cancelled));
    assert!(events
        .lock()
        .unwrap()
        .iter()
        .all(|e| e.generation != first_generation || !e.status.is_terminal()));

    assert!(provider.emit_success(vec![sample_proof()]));
    assert!(second.outcome().await.unwrap().is_success());
}

#[tokio::test]
async fn cancelled_waiter_never_runs_callback() {
    let provider = NullProvider::new();
    let (orch, events) = orchestrator(&provider);
    let handle = orch.begin(&config()).await.unwrap();
    let stale = provider.registered_sink().unwrap();
    let seen_before = events.lock().unwrap().len();

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let task = handle.on_outcome(move |outcome| sink.lock().unwrap().push(outcome));
    tokio::task::yield_now().await;

    // Aborting the task drops the handle it owns.
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert!(!stale.fail("too late"));
    provider.abandon();
    drop(stale);
    tokio::task::yield_now().await;

    assert!(received.lock().unwrap().is_empty());
    assert_eq!(events.lock().unwrap().len(), seen_before);
}

#[tokio::test]
async fn retry_after_failure_uses_fresh_handle() {
    let provider = NullProvider::new();
    let (orch, _events) = orchestrator(&provider);

    let mut first = orch.begin(&config()).await.unwrap();
    assert!(provider.emit_failure("denied"));
    assert!(!first.outcome().await.unwrap().is_success());

    let mut retry = orch.begin(&config()).await.unwrap();
    assert_ne!(retry.generation(), first.generation());
    assert!(provider.emit_success(vec![sample_proof()]));
    assert!(retry.outcome().await.unwrap().is_success());
}

#[tokio::test]
async fn on_outcome_callback_runs_once() {
    let provider = NullProvider::new();
    let (orch, _events) = orchestrator(&provider);
    let handle = orch.begin(&config()).await.unwrap();

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let task = handle.on_outcome(move |outcome| sink.lock().unwrap().push(outcome));

    assert!(provider.emit_success(vec![sample_proof()]));
    task.await.unwrap();
    assert!(!provider.emit_failure("late"));
    assert_eq!(received.lock().unwrap().len(), 1);
}
