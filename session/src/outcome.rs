//! Single-resolution outcome delivery.

use std::sync::{Arc, Mutex};

use soundgraph_types::{RawProof, SessionStatus};
use tokio::sync::oneshot;
use tracing::debug;

use crate::handle::SessionToken;

/// The terminal result of a verification attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    /// The user completed verification; carries every proof in provider order.
    Succeeded(Vec<RawProof>),
    /// The provider or user reported failure.
    Failed(String),
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Succeeded(_) => SessionStatus::Succeeded,
            Self::Failed(_) => SessionStatus::Failed,
        }
    }

    pub fn into_proofs(self) -> Result<Vec<RawProof>, String> {
        match self {
            Self::Succeeded(proofs) => Ok(proofs),
            Self::Failed(reason) => Err(reason),
        }
    }
}

/// Handed to the provider at session start; resolves the session exactly once.
///
/// Cloneable so a provider can route both its success and error paths to it.
/// Only the first delivery for a still-current session is accepted; every later
/// or stale delivery returns `false` and changes nothing.
#[derive(Clone)]
pub struct OutcomeSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    token: SessionToken,
    slot: Mutex<Option<oneshot::Sender<SessionOutcome>>>,
}

impl OutcomeSink {
    pub(crate) fn new(token: SessionToken, tx: oneshot::Sender<SessionOutcome>) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                token,
                slot: Mutex::new(Some(tx)),
            }),
        }
    }

    /// Deliver the proofs. Returns whether the outcome was accepted.
    pub fn succeed(&self, proofs: Vec<RawProof>) -> bool {
        self.deliver(SessionOutcome::Succeeded(proofs))
    }

    /// Deliver a failure reason. Returns whether the outcome was accepted.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.deliver(SessionOutcome::Failed(reason.into()))
    }

    /// Whether a delivery right now could still be accepted.
    pub fn is_open(&self) -> bool {
        self.inner.token.is_current()
            && self
                .inner
                .slot
                .lock()
                .map(|slot| slot.as_ref().is_some_and(|tx| !tx.is_closed()))
                .unwrap_or(false)
    }

    pub fn generation(&self) -> u64 {
        self.inner.token.generation()
    }

    fn deliver(&self, outcome: SessionOutcome) -> bool {
        let generation = self.inner.token.generation();
        if !self.inner.token.is_current() {
            debug!(generation, "ignoring outcome for a discarded session");
            return false;
        }

        let tx = match self.inner.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        let Some(tx) = tx else {
            debug!(generation, "ignoring duplicate outcome");
            return false;
        };

        let status = outcome.status();
        let accepted = tx.send(outcome).is_ok();
        debug!(generation, %status, accepted, "outcome delivered");
        accepted
    }
}
