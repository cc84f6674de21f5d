//! Vocabulary matching
//!
//! Three-tier, first-hit-wins matching of a candidate name against the
//! current canonical option set. Options are scanned in the order supplied
//! by the caller; callers that want longest-match-first semantics pre-sort.

use crate::models::CanonicalOption;
use crate::services::normalizer::normalize;

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Normalized forms are identical
    Exact,
    /// One normalized form contains the other
    Containment,
    /// A whitespace token of the candidate contains or is contained in
    /// the option's normalized value
    TokenOverlap,
}

/// A matched option together with the tier that found it
#[derive(Debug, Clone, Copy)]
pub struct VocabularyMatch<'a> {
    pub option: &'a CanonicalOption,
    pub tier: MatchTier,
}

/// Find the best existing option for a candidate name.
///
/// Tier 1 (exact) is exhausted across all options before tier 2
/// (containment), which is exhausted before tier 3 (token overlap).
/// Returns `None` only when no option satisfies any tier.
pub fn find_match<'a>(
    candidate: &str,
    options: &'a [CanonicalOption],
) -> Option<VocabularyMatch<'a>> {
    let needle = normalize(candidate);
    if needle.is_empty() {
        return None;
    }

    for option in options {
        if normalize(&option.value) == needle {
            return Some(VocabularyMatch {
                option,
                tier: MatchTier::Exact,
            });
        }
    }

    for option in options {
        let value = normalize(&option.value);
        if !value.is_empty() && (needle.contains(&value) || value.contains(&needle)) {
            return Some(VocabularyMatch {
                option,
                tier: MatchTier::Containment,
            });
        }
    }

    let tokens: Vec<&str> = needle.split_whitespace().collect();
    for option in options {
        let value = normalize(&option.value);
        if value.is_empty() {
            continue;
        }
        if tokens
            .iter()
            .any(|token| value.contains(token) || token.contains(value.as_str()))
        {
            return Some(VocabularyMatch {
                option,
                tier: MatchTier::TokenOverlap,
            });
        }
    }

    None
}
