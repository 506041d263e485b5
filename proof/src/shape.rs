//! Classification of raw provider proofs into the layouts observed in the wild.
//!
//! Extraction is an ordered sequence of fallible lookups; the first layout that
//! matches wins.

use serde_json::Value;
use soundgraph_types::RawProof;

use crate::normalizer::IdentifierOrigin;
use crate::value::{is_truthy, non_empty_str};

pub const IDENTIFIER: &str = "identifier";
pub const CLAIM_DATA: &str = "claimData";
pub const CONTEXT: &str = "context";
pub const EXTRACTED_PARAMETERS: &str = "extractedParameters";
pub const EXTRACTED_PARAMETER_VALUES: &str = "extractedParameterValues";

/// The claim context carried under `claimData.context`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClaimContext<'a> {
    /// JSON encoded into a string; may fail to parse.
    Encoded(&'a str),
    /// Already a structured JSON value.
    Structured(&'a Value),
}

/// Where a proof keeps its disclosed attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProofShape<'a> {
    /// `claimData.context` is present.
    ClaimContext(ClaimContext<'a>),
    /// Top-level `extractedParameterValues` is present.
    ExtractedValues(&'a Value),
    /// No recognised attribute container.
    Opaque,
}

impl<'a> ProofShape<'a> {
    pub fn classify(proof: &'a RawProof) -> Self {
        if let Some(context) = claim_data(proof)
            .and_then(|claim| claim.get(CONTEXT))
            .filter(|v| is_truthy(v))
        {
            return match context {
                Value::String(text) => Self::ClaimContext(ClaimContext::Encoded(text)),
                other => Self::ClaimContext(ClaimContext::Structured(other)),
            };
        }

        if let Some(values) = proof
            .field(EXTRACTED_PARAMETER_VALUES)
            .filter(|v| is_truthy(v))
        {
            return Self::ExtractedValues(values);
        }

        Self::Opaque
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ClaimContext(ClaimContext::Encoded(_)) => "claim_context_encoded",
            Self::ClaimContext(ClaimContext::Structured(_)) => "claim_context_structured",
            Self::ExtractedValues(_) => "extracted_values",
            Self::Opaque => "opaque",
        }
    }
}

/// The proof's own identifier, or the nested claim identifier.
pub fn find_identifier(proof: &RawProof) -> Option<(&str, IdentifierOrigin)> {
    if let Some(id) = non_empty_str(proof.field(IDENTIFIER)) {
        return Some((id, IdentifierOrigin::Proof));
    }
    non_empty_str(claim_data(proof).and_then(|claim| claim.get(IDENTIFIER)))
        .map(|id| (id, IdentifierOrigin::ClaimData))
}

fn claim_data(proof: &RawProof) -> Option<&serde_json::Map<String, Value>> {
    proof.field(CLAIM_DATA).and_then(Value::as_object)
}
