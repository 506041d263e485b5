//! Session status tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a verification attempt is in its lifecycle.
///
/// Transitions only move forward:
/// `Idle -> Initializing -> AwaitingProviderUrl -> AwaitingUserAction -> Succeeded`,
/// with `Failed` reachable from any non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No attempt started.
    Idle,
    /// Creating the provider request context.
    Initializing,
    /// Registering outcome delivery and fetching the verification URL.
    AwaitingProviderUrl,
    /// URL is available; waiting for the user to complete verification.
    AwaitingUserAction,
    /// Terminal: the provider delivered proofs.
    Succeeded,
    /// Terminal: any step or the provider reported failure.
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (Succeeded | Failed, _) => false,
            (_, Failed) => true,
            (Idle, Initializing)
            | (Initializing, AwaitingProviderUrl)
            | (AwaitingProviderUrl, AwaitingUserAction)
            | (AwaitingUserAction, Succeeded) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::AwaitingProviderUrl => "awaiting_provider_url",
            Self::AwaitingUserAction => "awaiting_user_action",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
