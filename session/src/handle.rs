//! The caller's view of one in-flight verification attempt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use soundgraph_types::SessionStatus;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::outcome::SessionOutcome;
use crate::progress::{ProgressBus, ProgressEvent, MSG_COMPLETE};
use crate::provider::ProviderSession;

/// Reason reported when the provider drops its sink without resolving.
pub(crate) const PROVIDER_CLOSED: &str = "provider closed the session without an outcome";

/// Shared generation counter for every session of one orchestrator.
///
/// Bumped on each `begin` and when the current handle is cancelled; waiters
/// are notified on every bump.
#[derive(Debug, Default)]
pub(crate) struct Generations {
    current: AtomicU64,
    changed: Notify,
}

impl Generations {
    /// Start a new generation, superseding any previous one.
    pub(crate) fn advance(&self) -> u64 {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        self.changed.notify_waiters();
        generation
    }

    fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    fn retire(&self, generation: u64) {
        if self
            .current
            .compare_exchange(generation, generation + 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.changed.notify_waiters();
        }
    }
}

/// Validity token tying outcome deliveries to one session generation.
///
/// A token is current only while the shared counter still equals its
/// generation. Cancelling a handle bumps the counter too, so late deliveries
/// see a stale token.
#[derive(Clone, Debug)]
pub struct SessionToken {
    generation: u64,
    generations: Arc<Generations>,
}

impl SessionToken {
    pub(crate) fn new(generation: u64, generations: Arc<Generations>) -> Self {
        Self {
            generation,
            generations,
        }
    }

    #[cfg(test)]
    pub(crate) fn first() -> Self {
        let generations = Arc::new(Generations::default());
        let generation = generations.advance();
        Self::new(generation, generations)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.generations.current() == self.generation
    }

    /// Make this token stale. Has no effect if a newer session already exists.
    pub(crate) fn invalidate(&self) {
        self.generations.retire(self.generation);
    }

    /// Resolves once this token is no longer current.
    async fn superseded(&self) {
        loop {
            let changed = self.generations.changed.notified();
            if !self.is_current() {
                return;
            }
            changed.await;
        }
    }
}

/// One verification attempt.
///
/// Returned by [`SessionOrchestrator::begin`](crate::SessionOrchestrator::begin)
/// once the verification URL is available. Resolve it with [`outcome`] or
/// [`on_outcome`]; drop it (or call [`cancel`]) to abandon the attempt.
///
/// [`outcome`]: SessionHandle::outcome
/// [`on_outcome`]: SessionHandle::on_outcome
/// [`cancel`]: SessionHandle::cancel
pub struct SessionHandle {
    token: SessionToken,
    status: SessionStatus,
    status_message: String,
    request_url: Option<String>,
    outcome_rx: Option<oneshot::Receiver<SessionOutcome>>,
    provider_session: Option<Box<dyn ProviderSession>>,
    progress: Arc<ProgressBus>,
}

impl SessionHandle {
    pub(crate) fn new(token: SessionToken, progress: Arc<ProgressBus>) -> Self {
        Self {
            token,
            status: SessionStatus::Idle,
            status_message: String::new(),
            request_url: None,
            outcome_rx: None,
            provider_session: None,
            progress,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Human-readable progress text for the current step.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// The verification URL to embed. `None` before it is known and after the
    /// session reaches a terminal state.
    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.token.generation()
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Whether this handle can still receive an outcome.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal() && self.token.is_current()
    }

    /// Wait for the terminal outcome.
    ///
    /// Resolves once. Afterwards the handle is terminal, the URL is cleared and
    /// any embedded verification surface should be closed. A second call
    /// returns [`SessionError::AlreadyResolved`]; a call on a handle superseded
    /// by a newer session returns [`SessionError::Cancelled`].
    pub async fn outcome(&mut self) -> Result<SessionOutcome, SessionError> {
        if self.status.is_terminal() {
            return Err(SessionError::AlreadyResolved);
        }
        if !self.token.is_current() {
            return Err(SessionError::Cancelled);
        }
        let rx = self.outcome_rx.take().ok_or(SessionError::AlreadyResolved)?;

        let received = tokio::select! {
            received = rx => Some(received),
            _ = self.token.superseded() => None,
        };
        // Whatever arrived, a superseded handle reports nothing.
        let Some(received) = received.filter(|_| self.token.is_current()) else {
            debug!(generation = self.generation(), "session superseded while awaiting outcome");
            return Err(SessionError::Cancelled);
        };

        let outcome = match received {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    generation = self.generation(),
                    "provider dropped the outcome sink without resolving"
                );
                SessionOutcome::Failed(PROVIDER_CLOSED.to_string())
            }
        };

        let message = match &outcome {
            SessionOutcome::Succeeded(proofs) => {
                info!(generation = self.generation(), proofs = proofs.len(), "verification succeeded");
                MSG_COMPLETE.to_string()
            }
            SessionOutcome::Failed(reason) => {
                info!(generation = self.generation(), %reason, "verification failed");
                format!("Verification failed: {reason}")
            }
        };
        self.request_url = None;
        self.provider_session = None;
        self.advance(outcome.status(), message);
        Ok(outcome)
    }

    /// Invoke `callback` with the outcome once it arrives, on a spawned task.
    ///
    /// The callback is not invoked if the handle is superseded before the
    /// outcome arrives. Must be called within a tokio runtime.
    pub fn on_outcome<F>(mut self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(SessionOutcome) + Send + 'static,
    {
        tokio::spawn(async move {
            match self.outcome().await {
                Ok(outcome) => callback(outcome),
                Err(e) => debug!(generation = self.generation(), error = %e, "outcome not delivered"),
            }
        })
    }

    /// Abandon the attempt. Any outcome the provider delivers afterwards is
    /// dropped.
    pub fn cancel(self) {
        debug!(generation = self.generation(), "session cancelled");
        self.token.invalidate();
    }

    pub(crate) fn advance(&mut self, status: SessionStatus, message: impl Into<String>) {
        debug_assert!(
            self.status.can_transition_to(status),
            "illegal session transition {} -> {}",
            self.status,
            status
        );
        self.status = status;
        self.set_message(message);
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.progress.emit(&ProgressEvent {
            generation: self.token.generation(),
            status: self.status,
            message: self.status_message.clone(),
        });
    }

    pub(crate) fn attach(
        &mut self,
        outcome_rx: oneshot::Receiver<SessionOutcome>,
        provider_session: Box<dyn ProviderSession>,
    ) {
        self.outcome_rx = Some(outcome_rx);
        self.provider_session = Some(provider_session);
    }

    pub(crate) fn set_request_url(&mut self, url: String) {
        self.request_url = Some(url);
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if !self.status.is_terminal() && self.token.is_current() {
            debug!(generation = self.token.generation(), status = %self.status, "session discarded");
        }
        self.token.invalidate();
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("generation", &self.token.generation())
            .field("status", &self.status)
            .field("status_message", &self.status_message)
            .field("request_url", &self.request_url)
            .finish()
    }
}
