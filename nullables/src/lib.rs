//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (the proof provider, the placeholder identifier
//! source) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests and offline runs.

pub mod identifiers;
pub mod provider;

pub use identifiers::NullIdentifiers;
pub use provider::{NullProvider, ProviderCall};
