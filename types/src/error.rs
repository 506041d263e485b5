//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("share page URL must use http or https: {0}")]
    InvalidSharePageUrl(String),
}
