//! Proof payload normalization.
//!
//! The proof provider returns loosely-typed proof objects whose layout varies
//! between provider versions. This crate maps them onto a stable model:
//!
//! 1. [`ProofShape`] classifies a raw proof into one of the observed layouts.
//! 2. [`ProofNormalizer`] turns the proof sequence into a [`ProfileSnapshot`]
//!    (identifier + attribute map + the raw proofs for audit display).
//! 3. [`DisplayModel`] derives the stats, track and artist views on demand,
//!    substituting labelled placeholder data wherever an attribute is missing.
//!
//! Nothing here returns an error: malformed input degrades to defaults and is
//! logged.

pub mod display;
pub mod identifier;
pub mod normalizer;
pub mod shape;
pub mod value;

pub use display::{Artist, DataSource, DisplayModel, ListView, Stat, Track, MAX_LIST_ENTRIES};
pub use identifier::{IdentifierGenerator, RandomPlaceholder};
pub use normalizer::{Attributes, IdentifierOrigin, ProfileSnapshot, ProofNormalizer};
pub use shape::{ClaimContext, ProofShape};
