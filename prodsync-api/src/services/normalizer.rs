//! Text normalization for vocabulary comparison
//!
//! Every equality and containment check in the pipeline goes through
//! `normalize`; raw case-sensitive comparison is never used.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize text for comparison: Unicode canonical decomposition,
/// combining-mark removal, lower-casing, whitespace trim.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_diacritics() {
        assert_eq!(normalize("São Paulo"), "sao paulo");
        assert_eq!(normalize("  Resolume Arena  "), "resolume arena");
        assert_eq!(normalize("ÀÇÃO"), "acao");
    }

    #[test]
    fn is_idempotent() {
        for input in ["São Paulo", "  Windows 10 ", "bärtender", ""] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn preserves_interior_whitespace() {
        assert_eq!(normalize("Windows  10"), "windows  10");
    }
}
