//! Nullable identifier source — deterministic placeholder identifiers.

use soundgraph_proof::IdentifierGenerator;
use std::sync::Mutex;

/// Returns pre-configured identifiers in order, cycling when exhausted.
pub struct NullIdentifiers {
    ids: Vec<String>,
    index: Mutex<usize>,
}

impl NullIdentifiers {
    pub fn new(ids: Vec<String>) -> Self {
        assert!(!ids.is_empty(), "NullIdentifiers needs at least one id");
        Self {
            ids,
            index: Mutex::new(0),
        }
    }

    /// Create with a single value returned for every call.
    pub fn constant(id: &str) -> Self {
        Self::new(vec![id.to_string()])
    }
}

impl IdentifierGenerator for NullIdentifiers {
    fn generate(&self) -> String {
        let mut idx = self.index.lock().unwrap();
        let id = self.ids[*idx % self.ids.len()].clone();
        *idx += 1;
        id
    }
}
