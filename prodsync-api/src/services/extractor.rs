//! Candidate product name extraction
//!
//! Derives a candidate from a summary in two stages: a structural seed from
//! the `anything / middle-field / trailing-digits` summary shape, then a
//! generative extraction pass over the seed. The generative channel is
//! advisory; a failed or inconclusive call degrades to the seed itself.
//! A summary without the structural shape yields no candidate.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::{Candidate, CandidateSource};
use crate::services::normalizer::normalize;
use crate::services::validator::ProductValidator;
use crate::types::TextGenerator;

/// Structural summary shape: `anything / middle-field / trailing-digits`,
/// whitespace-tolerant around the slashes.
static STRUCTURAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^/]+/(?P<product>[^/]+)/\s*\d+\s*$").expect("valid structural pattern")
});

/// Trailing `- ...` qualifier segment starting with a digit
/// (quantities and plan sizes, e.g. "- 2 computadores").
static TRAILING_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*-\s*\d.*$").expect("valid qualifier pattern"));

/// Extraction policy knobs
#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    /// Cadence/descriptor tokens stripped from structural seeds
    pub strip_patterns: Vec<String>,
    /// Reject candidates the generative validator does not affirm
    pub require_validation: bool,
}

/// Build the extraction prompt for a structural seed
fn extraction_prompt(seed: &str) -> String {
    format!(
        "Extract ONLY the name of the software or system from the summary below. \
         Do NOT include license tiers, computer counts, billing plans, or vendor names.\n\n\
         Summary: \"{}\"\n\n\
         Answer with the product name alone, e.g. \"Resolume Arena\", \"Bartender\", \
         \"Windows 10\", \"SketchUp\". If there is none, answer exactly \"N/A\".",
        seed
    )
}

/// Trim surrounding quote characters from a generative response
fn trim_quotes(text: &str) -> &str {
    text.trim_matches('"')
}

/// Drop everything that is not alphanumeric or whitespace
fn strip_symbols(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Collapse runs of whitespace into single spaces and trim
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Candidate extractor combining structural and generative derivation
pub struct ProductExtractor {
    generator: Option<Arc<dyn TextGenerator>>,
    validator: Option<ProductValidator>,
    strip_regex: Option<Regex>,
    require_validation: bool,
}

impl ProductExtractor {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, settings: ExtractorSettings) -> Self {
        let strip_regex = if settings.strip_patterns.is_empty() {
            None
        } else {
            let alternation = settings
                .strip_patterns
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
                    .case_insensitive(true)
                    .build()
                    .expect("valid strip pattern alternation"),
            )
        };

        let validator = generator.as_ref().map(|g| ProductValidator::new(g.clone()));

        Self {
            generator,
            validator,
            strip_regex,
            require_validation: settings.require_validation,
        }
    }

    /// Derive the structural seed from a summary, or `None` when the
    /// summary has no usable shape.
    pub fn derive_seed(&self, summary: &str) -> Option<String> {
        let captures = STRUCTURAL_PATTERN.captures(summary)?;
        let raw = captures.name("product")?.as_str().trim();

        let without_qualifier = TRAILING_QUALIFIER.replace(raw, "");
        let without_cadence = match &self.strip_regex {
            Some(strip) => strip.replace_all(&without_qualifier, "").into_owned(),
            None => without_qualifier.into_owned(),
        };
        let seed = collapse_whitespace(&strip_symbols(&without_cadence));

        (!seed.is_empty()).then_some(seed)
    }

    /// Extract a candidate product name from a summary.
    ///
    /// Returns `None` only when no seed could be derived, or when the
    /// validation policy rejects the candidate. A missing or inconclusive
    /// generative response degrades to the seed instead of aborting.
    pub async fn extract(&self, summary: &str) -> Option<Candidate> {
        let seed = self.derive_seed(summary)?;
        debug!(summary = %summary, seed = %seed, "Derived structural seed");

        let mut candidate = match &self.generator {
            None => Candidate {
                text: seed,
                source: CandidateSource::Structural,
                validated: false,
            },
            Some(generator) => match generator.generate(&extraction_prompt(&seed)).await {
                Ok(response) => {
                    let name = trim_quotes(response.trim()).trim().to_string();
                    if name.is_empty() || normalize(&name) == "n/a" {
                        debug!(seed = %seed, "Generative extraction inconclusive, using seed");
                        Candidate {
                            text: seed,
                            source: CandidateSource::RegexFallback,
                            validated: false,
                        }
                    } else {
                        Candidate {
                            text: name,
                            source: CandidateSource::Generative,
                            validated: false,
                        }
                    }
                }
                Err(e) => {
                    warn!(seed = %seed, error = %e, "Generative extraction failed, using seed");
                    Candidate {
                        text: seed,
                        source: CandidateSource::RegexFallback,
                        validated: false,
                    }
                }
            },
        };

        match &self.validator {
            Some(validator) => {
                candidate.validated = validator.validate(&candidate.text).await;
                if self.require_validation && !candidate.validated {
                    debug!(
                        candidate = %candidate.text,
                        "Candidate not affirmed by validator, rejecting per policy"
                    );
                    return None;
                }
            }
            None => {
                if self.require_validation {
                    warn!(
                        candidate = %candidate.text,
                        "require_validation set but no generative service configured, rejecting"
                    );
                    return None;
                }
            }
        }

        Some(candidate)
    }
}
