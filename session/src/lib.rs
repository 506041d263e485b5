//! Verification session orchestration.
//!
//! A [`SessionOrchestrator`] drives exactly one proof request per
//! [`SessionHandle`]:
//!
//! 1. **Init**: create a request context with the [`ProofProvider`].
//! 2. **Register**: hand the provider an [`OutcomeSink`] for the terminal result.
//! 3. **URL**: fetch the verification URL the caller embeds for the user.
//!
//! The terminal result arrives once, asynchronously, through
//! [`SessionHandle::outcome`]. Discarding the handle cancels the attempt; any
//! outcome the provider delivers afterwards is dropped.
//!
//! The provider is an injected dependency, never a concrete binding, so it can
//! be replaced by a test double.

pub mod error;
pub mod handle;
pub mod orchestrator;
pub mod outcome;
pub mod progress;
pub mod provider;
pub mod tracing_spans;

pub use error::{ProviderError, SessionError};
pub use handle::{SessionHandle, SessionToken};
pub use orchestrator::SessionOrchestrator;
pub use outcome::{OutcomeSink, SessionOutcome};
pub use progress::{ProgressBus, ProgressEvent};
pub use provider::{ProofProvider, ProviderSession};
pub use soundgraph_types::SessionStatus;
