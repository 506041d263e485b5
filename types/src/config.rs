//! Verification request configuration.

use crate::ids::non_empty;
use crate::{ApplicationId, ApplicationSecret, ConfigError, ProviderId};

/// Immutable input to a single verification attempt.
///
/// Every identifier is validated non-empty at construction. The secret is held
/// as an [`ApplicationSecret`] so the derived `Debug` never prints it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationConfig {
    application_id: ApplicationId,
    application_secret: ApplicationSecret,
    provider_id: ProviderId,
    share_page_url: String,
    use_embedded_flow: bool,
}

impl VerificationConfig {
    pub fn new(
        application_id: &str,
        application_secret: &str,
        provider_id: &str,
        share_page_url: &str,
        use_embedded_flow: bool,
    ) -> Result<Self, ConfigError> {
        let share_page_url = non_empty(share_page_url.to_string(), "share_page_url")?;
        if !(share_page_url.starts_with("https://") || share_page_url.starts_with("http://")) {
            return Err(ConfigError::InvalidSharePageUrl(share_page_url));
        }

        Ok(Self {
            application_id: ApplicationId::new(application_id)?,
            application_secret: ApplicationSecret::new(application_secret)?,
            provider_id: ProviderId::new(provider_id)?,
            share_page_url,
            use_embedded_flow,
        })
    }

    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    pub fn application_secret(&self) -> &ApplicationSecret {
        &self.application_secret
    }

    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    pub fn share_page_url(&self) -> &str {
        &self.share_page_url
    }

    /// Whether the provider should use its embedded (in-page) flow rather than
    /// handing off to a native app clip.
    pub fn use_embedded_flow(&self) -> bool {
        self.use_embedded_flow
    }
}
