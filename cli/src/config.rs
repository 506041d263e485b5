//! CLI configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use soundgraph_types::{ConfigError, VerificationConfig};
use soundgraph_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Settings for the `soundgraph` binary.
///
/// Loaded from a TOML file via [`CliConfig::from_toml_file`]; command line
/// flags override individual fields. The application secret is deliberately
/// absent: it is only ever taken from `--app-secret` or the environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Application identifier registered with the proof provider.
    #[serde(default)]
    pub application_id: String,

    /// Which provider template (data source) to request a proof from.
    #[serde(default)]
    pub provider_id: String,

    /// Public page URL the provider may link back to.
    #[serde(default = "default_share_page_url")]
    pub share_page_url: String,

    /// Request the provider's lightweight embedded flow.
    #[serde(default)]
    pub use_embedded_flow: bool,

    /// Log output format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_share_page_url() -> String {
    "https://soundgraph.example/share".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigFileError> {
        toml::from_str(s).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }

    /// Build the validated core configuration, pairing this file's settings
    /// with a secret supplied out of band.
    pub fn verification_config(&self, secret: &str) -> Result<VerificationConfig, ConfigError> {
        VerificationConfig::new(
            self.application_id.as_str(),
            secret,
            self.provider_id.as_str(),
            self.share_page_url.as_str(),
            self.use_embedded_flow,
        )
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            provider_id: String::new(),
            share_page_url: default_share_page_url(),
            use_embedded_flow: false,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
