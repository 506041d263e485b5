//! Session orchestrator: drives one proof request from initialization to the
//! point where the user can act, then hands the caller a [`SessionHandle`].

use std::sync::Arc;

use soundgraph_types::{SessionStatus, VerificationConfig};
use tokio::sync::oneshot;
use tracing::{info, warn, Instrument};

use crate::error::{ProviderError, SessionError};
use crate::handle::{Generations, SessionHandle, SessionToken};
use crate::outcome::OutcomeSink;
use crate::progress::{
    ProgressBus, ProgressEvent, MSG_BUILDING, MSG_INITIALIZING, MSG_OPENING, MSG_STARTING,
};
use crate::provider::ProofProvider;
use crate::tracing_spans::{provider_call_span, session_span};

/// Drives verification attempts against an injected [`ProofProvider`].
///
/// At most one session is active per orchestrator: every call to
/// [`begin`](Self::begin) supersedes the previous handle, whose late outcomes
/// are then ignored.
pub struct SessionOrchestrator {
    provider: Arc<dyn ProofProvider>,
    generations: Arc<Generations>,
    progress: Arc<ProgressBus>,
}

impl SessionOrchestrator {
    pub fn new(provider: Arc<dyn ProofProvider>) -> Self {
        Self {
            provider,
            generations: Arc::new(Generations::default()),
            progress: Arc::new(ProgressBus::new()),
        }
    }

    /// Register a listener for progress events of every session started by
    /// this orchestrator.
    pub fn on_progress(&self, listener: impl Fn(&ProgressEvent) + Send + Sync + 'static) {
        self.progress.subscribe(Box::new(listener));
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Start a verification attempt.
    ///
    /// Advances `Idle -> Initializing -> AwaitingProviderUrl ->
    /// AwaitingUserAction`, emitting a progress event at each step, and returns
    /// the handle once the verification URL is known. Any failure before that
    /// point is returned here (and emitted as a `Failed` progress event); no
    /// retry is attempted. Later failures arrive through
    /// [`SessionHandle::outcome`].
    pub async fn begin(&self, config: &VerificationConfig) -> Result<SessionHandle, SessionError> {
        let generation = self.generations.advance();
        let token = SessionToken::new(generation, Arc::clone(&self.generations));
        let mut handle = SessionHandle::new(token, Arc::clone(&self.progress));

        let span = session_span(config.provider_id().as_str(), generation);
        match self.drive(&mut handle, config).instrument(span).await {
            Ok(()) => Ok(handle),
            Err(e) => {
                warn!(generation, error = %e, "session failed during setup");
                handle.advance(SessionStatus::Failed, format!("Failed to initialize: {}", e.reason()));
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        handle: &mut SessionHandle,
        config: &VerificationConfig,
    ) -> Result<(), SessionError> {
        handle.advance(SessionStatus::Initializing, MSG_INITIALIZING);
        info!(
            application_id = %config.application_id(),
            provider = self.provider.name(),
            embedded = config.use_embedded_flow(),
            "initializing proof request"
        );

        let mut session = self
            .provider
            .init(config)
            .instrument(provider_call_span("init"))
            .await
            .map_err(SessionError::ProviderInit)?;

        handle.advance(SessionStatus::AwaitingProviderUrl, MSG_STARTING);

        // Outcome delivery must be registered before the URL is requested.
        let (tx, rx) = oneshot::channel();
        let sink = OutcomeSink::new(handle.token().clone(), tx);
        session
            .start_session(sink)
            .instrument(provider_call_span("start_session"))
            .await
            .map_err(SessionError::SessionStart)?;

        handle.set_message(MSG_BUILDING);
        let url = session
            .request_url()
            .instrument(provider_call_span("request_url"))
            .await
            .map_err(SessionError::RequestUrl)?;
        if url.trim().is_empty() {
            return Err(SessionError::RequestUrl(ProviderError::InvalidResponse(
                "empty verification URL".into(),
            )));
        }

        info!(%url, "verification URL ready");
        handle.attach(rx, session);
        handle.set_request_url(url);
        handle.advance(SessionStatus::AwaitingUserAction, MSG_OPENING);
        Ok(())
    }
}
