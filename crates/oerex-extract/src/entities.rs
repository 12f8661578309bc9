//! Categorical entity extraction: catalyst, substrate, electrolyte.
//!
//! Catalyst and substrate use a two-tier strategy. Tier 1 captures spans
//! anchored to clause structure ("... catalyst", "deposited on ...") and
//! validates them against the closed vocabulary, yielding rich names like
//! "NiFe-LDH nanosheets" when grammar cooperates. Tier 2 falls back to a
//! direct keyword scan, guaranteeing a bare-keyword best effort.

use std::sync::LazyLock;

use regex::Regex;

use crate::vocab;

/// Minimum word count for a structural catalyst-name candidate. Shorter
/// captures fall through to the keyword scan. Tunable, not a law.
const MIN_CANDIDATE_WORDS: usize = 2;

/// Span immediately preceding "catalyst"/"electrocatalyst".
static CATALYST_STRUCTURAL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"([A-Za-z0-9α-ω\-\(\)/·–\s]{3,60}?)\s*(?:electrocatalyst|catalyst)s?\b")
            .expect("catalyst pattern compiles"),
    ]
});

/// Span following "deposited on"/"supported on"/"grown on".
static SUBSTRATE_STRUCTURAL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(?:deposited|supported|grown)\s+on(?:to)?\s+([A-Za-z0-9\- ]{2,40})")
            .expect("substrate pattern compiles"),
    ]
});

/// Electrolyte concentration, "<number> M" anywhere in the text.
static CONCENTRATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)\s*M\b").expect("concentration pattern compiles"));

/// Extracted categorical entities, each `None` when nothing matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entities {
    pub catalyst: Option<String>,
    pub substrate: Option<String>,
    pub electrolyte: Option<String>,
    pub electrolyte_concentration_m: Option<f64>,
}

/// Tier 1: first structural capture that validates against the vocabulary.
fn structural_candidate(
    text: &str,
    patterns: &[Regex],
    matcher: &vocab::VocabMatcher,
    min_words: usize,
) -> Option<String> {
    for re in patterns {
        for caps in re.captures_iter(text) {
            let candidate = caps[1].trim();
            if candidate.split_whitespace().count() >= min_words && matcher.validates(candidate) {
                return Some(candidate.to_string());
            }
        }
    }
    None
}

/// Identify the catalyst material named in the text.
pub fn find_catalyst(text: &str) -> Option<String> {
    structural_candidate(
        text,
        &CATALYST_STRUCTURAL,
        &vocab::CATALYST_MATCHER,
        MIN_CANDIDATE_WORDS,
    )
    .or_else(|| vocab::CATALYST_MATCHER.first_match(text).map(String::from))
}

/// Identify the support substrate named in the text.
pub fn find_substrate(text: &str) -> Option<String> {
    structural_candidate(text, &SUBSTRATE_STRUCTURAL, &vocab::SUBSTRATE_MATCHER, 1)
        .or_else(|| vocab::SUBSTRATE_MATCHER.first_match(text).map(String::from))
}

/// Resolve the electrolyte against the closed vocabulary and capture the
/// concentration separately. No free-text capture.
pub fn find_electrolyte(text: &str) -> (Option<String>, Option<f64>) {
    let electrolyte = vocab::ELECTROLYTE_MATCHER.first_match(text).map(String::from);
    let concentration = CONCENTRATION
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    (electrolyte, concentration)
}

/// Extract all categorical entities from article text.
pub fn extract_entities(text: &str) -> Entities {
    let (electrolyte, electrolyte_concentration_m) = find_electrolyte(text);
    Entities {
        catalyst: find_catalyst(text),
        substrate: find_substrate(text),
        electrolyte,
        electrolyte_concentration_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalyst_structural_rich_name() {
        let text = "The NiFe-LDH nanosheets electrocatalyst showed high activity.";
        let catalyst = find_catalyst(text).unwrap();
        assert!(catalyst.contains("NiFe-LDH"));
        assert!(catalyst.contains("nanosheets"));
    }

    #[test]
    fn catalyst_fallback_bare_keyword() {
        // No "... catalyst" clause, keyword scan still answers
        let text = "Thin films of Co3O4 were studied for oxygen evolution.";
        assert_eq!(find_catalyst(text).as_deref(), Some("Co3O4"));
    }

    #[test]
    fn catalyst_unvalidated_span_rejected() {
        // Structural span with no known material falls back, and the
        // fallback finds nothing either
        let text = "An improved commercial benchmark catalyst was purchased.";
        assert_eq!(find_catalyst(text), None);
    }

    #[test]
    fn substrate_structural() {
        let text = "The active layer was deposited on nickel foam electrodes.";
        let substrate = find_substrate(text).unwrap();
        assert!(substrate.contains("nickel foam"));
    }

    #[test]
    fn substrate_fallback() {
        let text = "A carbon cloth electrode served as the support.";
        assert_eq!(find_substrate(text).as_deref(), Some("carbon cloth"));
    }

    #[test]
    fn electrolyte_and_concentration() {
        let (electrolyte, conc) = find_electrolyte("tested in 1.0 M KOH solution");
        assert_eq!(electrolyte.as_deref(), Some("KOH"));
        assert_eq!(conc, Some(1.0));
    }

    #[test]
    fn electrolyte_absent() {
        let (electrolyte, conc) = find_electrolyte("measured in ultrapure water");
        assert_eq!(electrolyte, None);
        assert_eq!(conc, None);
    }
}
