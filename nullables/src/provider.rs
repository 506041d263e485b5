//! Nullable proof provider — a scripted stand-in for the provider SDK.
//!
//! Records every call it receives, can be told to fail at any step, and lets
//! the test resolve the session at any time via [`NullProvider::emit_success`]
//! / [`NullProvider::emit_failure`].

use async_trait::async_trait;
use soundgraph_session::{
    OutcomeSink, ProofProvider, ProviderError, ProviderSession, SessionOutcome,
};
use soundgraph_types::{RawProof, VerificationConfig};
use std::sync::{Arc, Mutex};

/// Default URL handed out by [`NullProvider`].
pub const NULL_REQUEST_URL: &str = "https://verify.null.invalid/session/1";

/// A call the provider received, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderCall {
    Init {
        application_id: String,
        provider_id: String,
        share_page_url: String,
        use_embedded_flow: bool,
        /// Whether the secret matched the one set with
        /// [`NullProvider::expecting_secret`]; always `true` without one.
        secret_accepted: bool,
    },
    StartSession,
    RequestUrl,
    /// The caller dropped the provider session.
    SessionDropped,
}

#[derive(Clone, Default)]
struct Script {
    url: Option<String>,
    expected_secret: Option<String>,
    init_error: Option<ProviderError>,
    start_error: Option<ProviderError>,
    url_error: Option<ProviderError>,
    resolve_on_start: Option<SessionOutcome>,
}

#[derive(Default)]
struct Inner {
    script: Mutex<Script>,
    calls: Mutex<Vec<ProviderCall>>,
    sink: Mutex<Option<OutcomeSink>>,
}

/// A test provider. Cloning shares state, so a test can keep one clone for
/// assertions while the orchestrator owns another.
#[derive(Clone, Default)]
pub struct NullProvider {
    inner: Arc<Inner>,
}

impl NullProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out `url` from `request_url`.
    pub fn with_url(self, url: &str) -> Self {
        self.inner.script.lock().unwrap().url = Some(url.to_string());
        self
    }

    /// Reject `init` unless the config carries this application secret.
    pub fn expecting_secret(self, secret: &str) -> Self {
        self.inner.script.lock().unwrap().expected_secret = Some(secret.to_string());
        self
    }

    pub fn failing_init(self, error: ProviderError) -> Self {
        self.inner.script.lock().unwrap().init_error = Some(error);
        self
    }

    pub fn failing_start(self, error: ProviderError) -> Self {
        self.inner.script.lock().unwrap().start_error = Some(error);
        self
    }

    pub fn failing_url(self, error: ProviderError) -> Self {
        self.inner.script.lock().unwrap().url_error = Some(error);
        self
    }

    /// Deliver `outcome` from inside `start_session`, before the URL is
    /// requested.
    pub fn resolving_on_start(self, outcome: SessionOutcome) -> Self {
        self.inner.script.lock().unwrap().resolve_on_start = Some(outcome);
        self
    }

    /// Deliver success to the most recently registered sink.
    /// Returns whether the orchestrator accepted it.
    pub fn emit_success(&self, proofs: Vec<RawProof>) -> bool {
        self.registered_sink().is_some_and(|sink| sink.succeed(proofs))
    }

    /// Deliver failure to the most recently registered sink.
    pub fn emit_failure(&self, reason: &str) -> bool {
        self.registered_sink().is_some_and(|sink| sink.fail(reason))
    }

    /// Drop the registered sink without delivering anything.
    pub fn abandon(&self) {
        self.inner.sink.lock().unwrap().take();
    }

    /// Whether the registered sink would still accept an outcome.
    pub fn sink_open(&self) -> bool {
        self.registered_sink().is_some_and(|sink| sink.is_open())
    }

    /// Clone of the most recently registered sink, for delivering to a session
    /// after it has been superseded.
    pub fn registered_sink(&self) -> Option<OutcomeSink> {
        self.inner.sink.lock().unwrap().clone()
    }

    /// Every call received so far (for assertions).
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ProviderCall) {
        self.inner.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ProofProvider for NullProvider {
    fn name(&self) -> &str {
        "null-provider"
    }

    async fn init(
        &self,
        config: &VerificationConfig,
    ) -> Result<Box<dyn ProviderSession>, ProviderError> {
        let script = self.inner.script.lock().unwrap().clone();
        let secret_accepted = script
            .expected_secret
            .as_deref()
            .map_or(true, |expected| expected == config.application_secret().expose());
        self.record(ProviderCall::Init {
            application_id: config.application_id().to_string(),
            provider_id: config.provider_id().to_string(),
            share_page_url: config.share_page_url().to_string(),
            use_embedded_flow: config.use_embedded_flow(),
            secret_accepted,
        });
        if !secret_accepted {
            return Err(ProviderError::Rejected("invalid application secret".into()));
        }
        if let Some(error) = script.init_error {
            return Err(error);
        }
        Ok(Box::new(NullSession {
            provider: self.clone(),
        }))
    }
}

struct NullSession {
    provider: NullProvider,
}

#[async_trait]
impl ProviderSession for NullSession {
    async fn start_session(&mut self, sink: OutcomeSink) -> Result<(), ProviderError> {
        self.provider.record(ProviderCall::StartSession);
        let script = self.provider.inner.script.lock().unwrap().clone();
        if let Some(error) = script.start_error {
            return Err(error);
        }

        *self.provider.inner.sink.lock().unwrap() = Some(sink.clone());
        match script.resolve_on_start {
            Some(SessionOutcome::Succeeded(proofs)) => {
                sink.succeed(proofs);
            }
            Some(SessionOutcome::Failed(reason)) => {
                sink.fail(reason);
            }
            None => {}
        }
        Ok(())
    }

    async fn request_url(&mut self) -> Result<String, ProviderError> {
        self.provider.record(ProviderCall::RequestUrl);
        let script = self.provider.inner.script.lock().unwrap().clone();
        if let Some(error) = script.url_error {
            return Err(error);
        }
        Ok(script.url.unwrap_or_else(|| NULL_REQUEST_URL.to_string()))
    }
}

impl Drop for NullSession {
    fn drop(&mut self) {
        self.provider.record(ProviderCall::SessionDropped);
    }
}
