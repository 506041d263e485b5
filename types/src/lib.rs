//! Fundamental types for SoundGraph.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! the verification request configuration, the session status enum, and the
//! opaque raw proof payload handed back by the proof provider.

pub mod config;
pub mod error;
pub mod ids;
pub mod proof;
pub mod secret;
pub mod status;

pub use config::VerificationConfig;
pub use error::ConfigError;
pub use ids::{ApplicationId, ProviderId};
pub use proof::RawProof;
pub use secret::ApplicationSecret;
pub use status::SessionStatus;
