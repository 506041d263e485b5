use thiserror::Error;

/// Errors reported by a [`ProofProvider`](crate::ProofProvider) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider rejected the request: {0}")]
    Rejected(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Why a verification attempt failed before a verification URL existed, or why
/// an outcome could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("provider initialization failed: {0}")]
    ProviderInit(ProviderError),

    #[error("session start failed: {0}")]
    SessionStart(ProviderError),

    #[error("verification URL unavailable: {0}")]
    RequestUrl(ProviderError),

    #[error("session outcome already delivered")]
    AlreadyResolved,

    #[error("session was cancelled or superseded")]
    Cancelled,
}

impl SessionError {
    /// Human-readable reason for display to the user.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Whether the error happened while setting the session up (before a
    /// verification URL was shown).
    pub fn is_init_phase(&self) -> bool {
        matches!(
            self,
            Self::ProviderInit(_) | Self::SessionStart(_) | Self::RequestUrl(_)
        )
    }
}
