//! The proof provider boundary.
//!
//! The provider performs proof generation and cryptographic verification; this
//! crate only drives its lifecycle. Implementations wrap a provider SDK or, in
//! tests, a scripted double.

use async_trait::async_trait;
use soundgraph_types::VerificationConfig;

use crate::error::ProviderError;
use crate::outcome::OutcomeSink;

/// Entry point to a proof provider.
#[async_trait]
pub trait ProofProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Create a request context scoped to the config's application and
    /// provider ids, honouring its embedded-flow and share-page options.
    async fn init(
        &self,
        config: &VerificationConfig,
    ) -> Result<Box<dyn ProviderSession>, ProviderError>;
}

/// One provider-side request context.
///
/// Dropping it signals that the caller no longer cares about the request.
#[async_trait]
pub trait ProviderSession: Send + Sync {
    /// Register where the terminal outcome goes. The provider may deliver to
    /// `sink` at any point after this call begins, including before it returns.
    async fn start_session(&mut self, sink: OutcomeSink) -> Result<(), ProviderError>;

    /// The shareable URL the user opens to complete verification.
    async fn request_url(&mut self) -> Result<String, ProviderError>;
}
