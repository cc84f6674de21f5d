//! Generative candidate validation
//!
//! Asks the generative channel whether a candidate is a real, publicly
//! known product. Advisory: any failure or non-affirmative answer counts
//! as "not validated", never as an error.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::types::TextGenerator;

/// Build the yes/no validation prompt for a candidate name
fn validation_prompt(candidate: &str) -> String {
    format!(
        "Is \"{}\" the name of a real, publicly known software or technology \
         product? Answer with exactly \"yes\" or \"no\", nothing else.",
        candidate
    )
}

/// Only an exact affirmative token (case-insensitive, after trimming
/// whitespace and surrounding quotes) counts as affirmative.
fn is_affirmative(response: &str) -> bool {
    response.trim().trim_matches('"').trim().eq_ignore_ascii_case("yes")
}

/// Product name validator backed by a generative text service
pub struct ProductValidator {
    generator: Arc<dyn TextGenerator>,
}

impl ProductValidator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Validate a candidate product name. Never fails: a generative error
    /// is logged and reported as not validated.
    pub async fn validate(&self, candidate: &str) -> bool {
        match self.generator.generate(&validation_prompt(candidate)).await {
            Ok(response) => {
                let affirmative = is_affirmative(&response);
                debug!(
                    candidate = %candidate,
                    response = %response.trim(),
                    affirmative,
                    "Candidate validation answer"
                );
                affirmative
            }
            Err(e) => {
                warn!(
                    candidate = %candidate,
                    error = %e,
                    "Candidate validation call failed, treating as not validated"
                );
                false
            }
        }
    }
}
