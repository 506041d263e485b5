//! Placeholder identifiers for proofs that carry none.
//!
//! These identifiers are display-only. They are not unique across processes,
//! not unpredictable in the fallback path, and must never be used for any
//! security decision.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Number of random bytes in a placeholder (rendered as 40 hex chars).
const PLACEHOLDER_BYTES: usize = 20;

/// Source of placeholder identifiers.
pub trait IdentifierGenerator: Send + Sync {
    /// Produce a fresh placeholder identifier.
    fn generate(&self) -> String;
}

/// Generates `0x`-prefixed 40-hex-char placeholders from the OS random source,
/// falling back to a clock/counter mix when that source is unavailable.
#[derive(Default)]
pub struct RandomPlaceholder {
    fallback_counter: AtomicU64,
}

impl RandomPlaceholder {
    pub fn new() -> Self {
        Self::default()
    }

    fn clock_bytes(&self) -> [u8; PLACEHOLDER_BYTES] {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let counter = self.fallback_counter.fetch_add(1, Ordering::Relaxed);

        let mut out = [0u8; PLACEHOLDER_BYTES];
        out[..16].copy_from_slice(&nanos.to_le_bytes());
        out[16..].copy_from_slice(&(counter as u32).to_le_bytes());
        out
    }
}

impl IdentifierGenerator for RandomPlaceholder {
    fn generate(&self) -> String {
        let mut bytes = [0u8; PLACEHOLDER_BYTES];
        if let Err(e) = getrandom::getrandom(&mut bytes) {
            warn!(error = %e, "OS random source unavailable, deriving placeholder from clock");
            bytes = self.clock_bytes();
        }
        format!("0x{}", hex::encode(bytes))
    }
}

/// Whether `s` has the placeholder layout (`0x` + 40 lowercase hex chars).
pub fn is_placeholder_format(s: &str) -> bool {
    s.strip_prefix("0x").is_some_and(|rest| {
        rest.len() == PLACEHOLDER_BYTES * 2
            && rest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    })
}
