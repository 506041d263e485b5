//! Proof sequence -> [`ProfileSnapshot`].
//!
//! Only the first proof contributes the identifier and attributes. Later proofs
//! are kept verbatim in [`ProfileSnapshot::raw_proofs`] for the raw view but are
//! never merged into the attribute map.

use serde::Serialize;
use serde_json::{Map, Value};
use soundgraph_types::RawProof;
use tracing::{debug, debug_span, warn};

use crate::identifier::{IdentifierGenerator, RandomPlaceholder};
use crate::shape::{find_identifier, ClaimContext, ProofShape, EXTRACTED_PARAMETERS};
use crate::value::is_truthy;

/// Parsed claim contents, keyed by attribute name.
pub type Attributes = Map<String, Value>;

/// Attribute key under which an unparseable or non-object payload is kept.
pub const OPAQUE_ATTRIBUTE: &str = "context";

/// Where the snapshot's identifier came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierOrigin {
    /// The proof's top-level `identifier`.
    Proof,
    /// `claimData.identifier`.
    ClaimData,
    /// Generated for display; no identifier was present.
    Placeholder,
}

/// The normalized result of a successful verification, used for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    identifier_hash: String,
    identifier_origin: IdentifierOrigin,
    attributes: Attributes,
    raw_proofs: Vec<RawProof>,
}

impl ProfileSnapshot {
    pub fn identifier_hash(&self) -> &str {
        &self.identifier_hash
    }

    pub fn identifier_origin(&self) -> IdentifierOrigin {
        self.identifier_origin
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn raw_proofs(&self) -> &[RawProof] {
        &self.raw_proofs
    }

    /// The first 16 characters of the identifier, for compact display.
    pub fn short_hash(&self) -> String {
        self.identifier_hash.chars().take(16).collect()
    }

    /// Pretty-printed JSON of every raw proof, for the raw view.
    pub fn raw_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.raw_proofs).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Maps provider proofs onto a [`ProfileSnapshot`]. Never fails.
pub struct ProofNormalizer {
    generator: Box<dyn IdentifierGenerator>,
}

impl ProofNormalizer {
    pub fn new() -> Self {
        Self::with_generator(Box::new(RandomPlaceholder::new()))
    }

    /// Use a specific placeholder source (deterministic in tests).
    pub fn with_generator(generator: Box<dyn IdentifierGenerator>) -> Self {
        Self { generator }
    }

    pub fn normalize(&self, proofs: Vec<RawProof>) -> ProfileSnapshot {
        let span = debug_span!("normalize", proofs = proofs.len());
        let _guard = span.enter();

        let Some(first) = proofs.first() else {
            debug!("no proofs supplied, using placeholder identifier");
            return ProfileSnapshot {
                identifier_hash: self.generator.generate(),
                identifier_origin: IdentifierOrigin::Placeholder,
                attributes: Attributes::new(),
                raw_proofs: proofs,
            };
        };

        let (identifier_hash, identifier_origin) = match find_identifier(first) {
            Some((id, origin)) => (id.to_string(), origin),
            None => {
                debug!("proof carries no identifier, using placeholder");
                (self.generator.generate(), IdentifierOrigin::Placeholder)
            }
        };

        let shape = ProofShape::classify(first);
        debug!(shape = shape.name(), "classified proof");
        let attributes = extract_attributes(shape);

        if proofs.len() > 1 {
            debug!(
                extra = proofs.len() - 1,
                "additional proofs kept for raw display only"
            );
        }

        ProfileSnapshot {
            identifier_hash,
            identifier_origin,
            attributes,
            raw_proofs: proofs,
        }
    }

    /// Normalize a JSON value holding either a proof array or a single proof.
    pub fn normalize_value(&self, value: Value) -> ProfileSnapshot {
        self.normalize(RawProof::from_value_many(value))
    }
}

impl Default for ProofNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_attributes(shape: ProofShape<'_>) -> Attributes {
    match shape {
        ProofShape::ClaimContext(ClaimContext::Encoded(text)) => {
            match serde_json::from_str::<Value>(text) {
                Ok(parsed) => from_context(parsed),
                Err(e) => {
                    warn!(error = %e, "claim context is not valid JSON, keeping it opaque");
                    opaque(Value::String(text.to_string()))
                }
            }
        }
        ProofShape::ClaimContext(ClaimContext::Structured(context)) => from_context(context.clone()),
        ProofShape::ExtractedValues(values) => into_attributes(values.clone()),
        ProofShape::Opaque => Attributes::new(),
    }
}

/// Prefer the context's `extractedParameters`, else the context itself.
fn from_context(context: Value) -> Attributes {
    match context {
        Value::Object(mut obj) => match obj.remove(EXTRACTED_PARAMETERS) {
            Some(params) if is_truthy(&params) => into_attributes(params),
            Some(params) => {
                obj.insert(EXTRACTED_PARAMETERS.to_string(), params);
                obj
            }
            None => obj,
        },
        other => into_attributes(other),
    }
}

fn into_attributes(value: Value) -> Attributes {
    match value {
        Value::Object(obj) => obj,
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(obj)) => obj,
            _ => opaque(Value::String(text)),
        },
        other => opaque(other),
    }
}

fn opaque(value: Value) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(OPAQUE_ATTRIBUTE.to_string(), value);
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::is_placeholder_format;
    use serde_json::json;

    struct FixedId;

    impl IdentifierGenerator for FixedId {
        fn generate(&self) -> String {
            "0xplaceholder".to_string()
        }
    }

    fn normalizer() -> ProofNormalizer {
        ProofNormalizer::with_generator(Box::new(FixedId))
    }

    fn proofs(v: Value) -> Vec<RawProof> {
        RawProof::from_value_many(v)
    }

    #[test]
    fn empty_input_yields_placeholder_and_no_attributes() {
        let snapshot = ProofNormalizer::new().normalize(Vec::new());
        assert!(snapshot.attributes().is_empty());
        assert!(snapshot.raw_proofs().is_empty());
        assert_eq!(snapshot.identifier_origin(), IdentifierOrigin::Placeholder);
        assert!(is_placeholder_format(snapshot.identifier_hash()));
    }

    #[test]
    fn encoded_context_with_extracted_parameters() {
        let snapshot = normalizer().normalize(proofs(json!([{
            "claimData": {"context": "{\"extractedParameters\":{\"totalTracks\":42}}"}
        }])));
        assert_eq!(snapshot.attribute("totalTracks"), Some(&json!(42)));
    }

    #[test]
    fn unparseable_context_is_kept_opaque() {
        let snapshot = normalizer().normalize(proofs(json!([{
            "identifier": "id-1",
            "claimData": {"context": "not json"}
        }])));
        assert_eq!(snapshot.identifier_hash(), "id-1");
        assert_eq!(snapshot.attributes().len(), 1);
        assert_eq!(snapshot.attribute(OPAQUE_ATTRIBUTE), Some(&json!("not json")));
    }

    #[test]
    fn context_without_extracted_parameters_used_whole() {
        let snapshot = normalizer().normalize(proofs(json!([{
            "claimData": {"context": {"topGenre": "Jazz", "providerHash": "0x1"}}
        }])));
        assert_eq!(snapshot.attribute("topGenre"), Some(&json!("Jazz")));
        assert_eq!(snapshot.attribute("providerHash"), Some(&json!("0x1")));
    }

    #[test]
    fn falsy_extracted_parameters_keeps_context() {
        let snapshot = normalizer().normalize(proofs(json!([{
            "claimData": {"context": {"extractedParameters": null, "topGenre": "Jazz"}}
        }])));
        assert_eq!(snapshot.attribute("topGenre"), Some(&json!("Jazz")));
        assert_eq!(snapshot.attribute(EXTRACTED_PARAMETERS), Some(&Value::Null));
    }

    #[test]
    fn top_level_extracted_values_used_when_no_context() {
        let snapshot = normalizer().normalize(proofs(json!([{
            "extractedParameterValues": {"totalArtists": "7"}
        }])));
        assert_eq!(snapshot.attribute("totalArtists"), Some(&json!("7")));
    }

    #[test]
    fn unrecognised_proof_has_empty_attributes() {
        let snapshot = normalizer().normalize(proofs(json!([{"signatures": ["0x1"]}])));
        assert!(snapshot.attributes().is_empty());
        assert_eq!(snapshot.identifier_hash(), "0xplaceholder");
        assert_eq!(snapshot.identifier_origin(), IdentifierOrigin::Placeholder);
    }

    #[test]
    fn non_object_context_wrapped() {
        let snapshot = normalizer().normalize(proofs(json!([{
            "claimData": {"context": "[1,2,3]"}
        }])));
        assert_eq!(snapshot.attribute(OPAQUE_ATTRIBUTE), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn claim_identifier_used_as_fallback() {
        let snapshot = normalizer().normalize(proofs(json!([{
            "claimData": {"identifier": "0xclaim", "context": "{}"}
        }])));
        assert_eq!(snapshot.identifier_hash(), "0xclaim");
        assert_eq!(snapshot.identifier_origin(), IdentifierOrigin::ClaimData);
    }

    #[test]
    fn later_proofs_are_retained_but_not_merged() {
        let input = json!([
            {"identifier": "first", "extractedParameterValues": {"a": 1}},
            {"identifier": "second", "extractedParameterValues": {"b": 2}}
        ]);
        let snapshot = normalizer().normalize(proofs(input.clone()));
        assert_eq!(snapshot.identifier_hash(), "first");
        assert_eq!(snapshot.attribute("a"), Some(&json!(1)));
        assert_eq!(snapshot.attribute("b"), None);
        assert_eq!(snapshot.raw_proofs().len(), 2);
        assert_eq!(
            serde_json::from_str::<Value>(&snapshot.raw_json_pretty()).unwrap(),
            input
        );
    }

    #[test]
    fn short_hash_truncates_to_sixteen_chars() {
        let snapshot = normalizer().normalize(proofs(json!({"identifier": "0x0123456789abcdef0123"})));
        assert_eq!(snapshot.short_hash(), "0x0123456789abcd");
    }

    #[test]
    fn normalize_value_accepts_single_object() {
        let snapshot = normalizer().normalize_value(json!({"identifier": "solo"}));
        assert_eq!(snapshot.identifier_hash(), "solo");
        assert_eq!(snapshot.raw_proofs().len(), 1);
    }
}
