//! Data model for the resolution pipeline
//!
//! Candidates are ephemeral (one per resolution attempt); canonical options
//! are owned by the external vocabulary store and only ever read or
//! appended, never edited or deleted.

use serde::{Deserialize, Serialize};

/// How a candidate product name was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Structural seed used directly (no generative channel configured)
    Structural,
    /// Name returned by the generative extraction call
    Generative,
    /// Structural seed used after a failed or inconclusive generative call
    RegexFallback,
}

/// A proposed product name, scoped to a single resolution attempt
#[derive(Debug, Clone)]
pub struct Candidate {
    pub text: String,
    pub source: CandidateSource,
    pub validated: bool,
}

/// Registered vocabulary entry in the external single-select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOption {
    /// Opaque identifier assigned by the external store
    pub id: String,
    pub value: String,
}

/// Issue key + summary pair from the project scan
#[derive(Debug, Clone)]
pub struct IssueSummary {
    pub key: String,
    pub summary: String,
}

/// Output contract of a completed resolution
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Canonical value written onto the issue (the store's representation,
    /// which may differ in casing from the extracted candidate)
    pub final_value: String,
    /// Whether this resolution created the vocabulary entry
    pub was_created: bool,
    /// The matched option, when the match went through the vocabulary
    pub matched_option: Option<CanonicalOption>,
}

/// Outcome handed to the HTTP layer
#[derive(Debug, Clone)]
pub enum ResolutionOutcome {
    Resolved(ResolutionResult),
    /// No usable candidate in the summary; a normal negative outcome
    NoProductIdentified,
}
