//! Raw proof payloads as returned by the proof provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One proof object exactly as the provider returned it.
///
/// No field is guaranteed to be present; interpretation is left to the
/// normalizer. Serializes transparently back to the original JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProof(Value);

impl RawProof {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a top-level field, if this proof is a JSON object.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.as_object().and_then(|obj| obj.get(name))
    }

    /// Parse a provider response body holding either an array of proofs or a
    /// single proof object.
    pub fn parse_many(body: &str) -> Result<Vec<RawProof>, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value_many(value))
    }

    /// Split a JSON value into proofs: arrays yield one proof per element,
    /// anything else is a single proof.
    pub fn from_value_many(value: Value) -> Vec<RawProof> {
        match value {
            Value::Array(items) => items.into_iter().map(RawProof).collect(),
            other => vec![RawProof(other)],
        }
    }
}

impl From<Value> for RawProof {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
