//! Pre-built [`tracing::Span`] constructors for session operations.
//!
//! Consistent span names and fields make it possible to follow one
//! verification attempt across log lines.

use tracing::{debug_span, info_span, Span};

/// Span covering one verification attempt from `begin` to URL availability.
pub fn session_span(provider_id: &str, generation: u64) -> Span {
    info_span!("session", provider = %provider_id, generation)
}

/// Span covering a single call into the proof provider.
pub fn provider_call_span(step: &'static str) -> Span {
    debug_span!("provider_call", step)
}
