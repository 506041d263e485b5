#![no_main]

use libfuzzer_sys::fuzz_target;
use soundgraph_proof::{DisplayModel, ProofNormalizer, MAX_LIST_ENTRIES};
use soundgraph_types::RawProof;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a provider response body.
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(proofs) = RawProof::parse_many(body) else {
        return;
    };

    let snapshot = ProofNormalizer::new().normalize(proofs);
    let model = DisplayModel::derive(&snapshot);
    assert!(!snapshot.identifier_hash().is_empty());
    assert!(model.tracks.entries.len() <= MAX_LIST_ENTRIES);
    assert!(model.artists.entries.len() <= MAX_LIST_ENTRIES);
    let _ = snapshot.raw_json_pretty();

    // The same body wrapped as an encoded claim context.
    let wrapped = serde_json::json!({"claimData": {"context": body}});
    let snapshot = ProofNormalizer::new().normalize(vec![RawProof::new(wrapped)]);
    let _ = DisplayModel::derive(&snapshot);
});
