//! Identifier newtypes for the application and provider a request is scoped to.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ConfigError;

/// The application identifier registered with the proof provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(s: impl Into<String>) -> Result<Self, ConfigError> {
        non_empty(s.into(), "application_id").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The provider (data source schema) identifier the proof is requested against.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(s: impl Into<String>) -> Result<Self, ConfigError> {
        non_empty(s.into(), "provider_id").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn non_empty(s: String, field: &'static str) -> Result<String, ConfigError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(field));
    }
    Ok(trimmed.to_string())
}
