//! The application secret used to sign proof requests.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ConfigError;

/// The application secret paired with an [`ApplicationId`](crate::ApplicationId).
///
/// This type intentionally does not implement `Display` or `Serialize`, and its
/// `Debug` output is redacted, so it cannot end up in logs or rendered output.
/// The bytes are zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApplicationSecret(String);

impl ApplicationSecret {
    pub fn new(s: impl Into<String>) -> Result<Self, ConfigError> {
        let mut s = s.into();
        if s.trim().is_empty() {
            s.zeroize();
            return Err(ConfigError::Empty("application_secret"));
        }
        Ok(Self(s))
    }

    /// Borrow the secret for handing to the proof provider.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApplicationSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApplicationSecret(<redacted>)")
    }
}

impl PartialEq for ApplicationSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ApplicationSecret {}
