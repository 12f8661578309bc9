//! Quantitative feature extraction and text statistics.
//!
//! Each feature owns an ordered pattern set; the first pattern producing a
//! parseable float wins. Overpotential gets extra treatment: sentence-level
//! context filtering, unit normalization to mV, a physical-plausibility
//! band, and a minimum-value tie-break.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

/// Quantitative features of one article, `None` when no pattern matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantFeatures {
    pub overpotential_mv: Option<f64>,
    pub current_density: Option<f64>,
    pub ph: Option<f64>,
    pub temperature_c: Option<f64>,
    pub tafel_slope_mv_per_dec: Option<f64>,
    pub faradaic_efficiency_pct: Option<f64>,
    pub turnover_frequency: Option<f64>,
    pub stability_hours: Option<f64>,
}

fn pattern_set(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("feature pattern compiles"))
        .collect()
}

static CURRENT_DENSITY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    pattern_set(&[
        r"(?i)(\d+\.?\d*)\s*mA\s*cm",
        r"(?i)current density[\s\S]{0,100}?(\d+\.?\d*)\s*mA",
        r"(?i)j\s*=\s*(\d+\.?\d*)\s*mA",
    ])
});

static PH: LazyLock<Vec<Regex>> =
    LazyLock::new(|| pattern_set(&[r"(?i)pH\s*[=:\s]\s*(\d+\.?\d*)", r"(?i)at pH\s*(\d+\.?\d*)"]));

static TEMPERATURE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    // Context-anchored pattern first: a bare "<n> C" match is too eager
    // and picks up C-rates and compound names.
    pattern_set(&[
        r"(?i)temperature[\s\S]{0,50}?(\d+\.?\d*)\s*°?C\b",
        r"(\d+\.?\d*)\s*°C",
    ])
});

static TAFEL_SLOPE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    pattern_set(&[
        r"(?i)Tafel slope[\s\S]{0,100}?(\d+\.?\d*)\s*mV",
        r"(?i)(\d+\.?\d*)\s*mV\s*dec",
        r"(?i)slope[\s\S]{0,50}?(\d+\.?\d*)\s*mV",
    ])
});

static FARADAIC_EFFICIENCY: LazyLock<Vec<Regex>> =
    LazyLock::new(|| pattern_set(&[r"(?i)faradaic efficiency[\s\S]{0,100}?(\d+\.?\d*)\s*%"]));

static TURNOVER_FREQUENCY: LazyLock<Vec<Regex>> =
    LazyLock::new(|| pattern_set(&[r"(?i)turnover frequency[\s\S]{0,100}?(\d+\.?\d*)"]));

static STABILITY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    pattern_set(&[
        r"(?i)stability[\s\S]{0,100}?(\d+\.?\d*)\s*h\b",
        r"(?i)stable[\s\S]{0,100}?(\d+\.?\d*)\s*h\b",
        r"(?i)(\d+\.?\d*)\s*hours?\b",
    ])
});

/// Overpotential value adjacent to a trigger word, applied per
/// context-filtered sentence. Trigger, optional linker, magnitude, unit.
static OVERPOTENTIAL_ANCHORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:η|overpotential)\s*(?:=|of|:|was|is)?\s*(\d{1,4}(?:\.\d+)?)\s*(mV|V)\b")
        .expect("overpotential pattern compiles")
});

/// Fallback capture for sentences that mention overpotential but phrase
/// the value away from the trigger ("required only 240 mV").
static OVERPOTENTIAL_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,4}(?:\.\d+)?)\s*(mV|V)\b").expect("overpotential pattern compiles")
});

/// Physical-plausibility band for normalized overpotentials, in mV.
/// Values outside are treated as extraction noise.
const OVERPOTENTIAL_RANGE_MV: (f64, f64) = (10.0, 2000.0);

/// First float captured by any pattern in the set, in order.
fn first_numeric(text: &str, patterns: &[Regex]) -> Option<f64> {
    for re in patterns {
        for caps in re.captures_iter(text) {
            if let Ok(value) = caps[1].parse::<f64>() {
                return Some(value);
            }
        }
    }
    None
}

/// Split text into sentence-like units on `.` or `;` followed by
/// whitespace, after collapsing runs of whitespace.
///
/// Scanning per sentence (instead of one unanchored regex over the whole
/// document) keeps overpotential matching precise and avoids pathological
/// backtracking on long texts.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let bytes = normalized.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if (b == b'.' || b == b';') && bytes.get(i + 1) == Some(&b' ') {
            sentences.push(normalized[start..=i].to_string());
            start = i + 2;
        }
    }
    if start < normalized.len() {
        sentences.push(normalized[start..].to_string());
    }
    sentences
}

/// Whether a sentence is worth scanning for an overpotential value.
fn has_overpotential_context(sentence: &str) -> bool {
    let lowered = sentence.to_lowercase();
    lowered.contains("overpotential")
        || lowered.contains('η')
        || lowered.contains("mv")
        || lowered.contains(" v")
}

/// Best (minimum) plausible overpotential in mV, or `None`.
///
/// Papers headline their lowest overpotential; additional mentions are
/// usually baselines or competitor values, so the minimum across all
/// in-band candidates is the reported value.
fn extract_overpotential(text: &str) -> Option<f64> {
    let sentences: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|s| has_overpotential_context(s))
        .collect();

    // Trigger-adjacent matches first; the bare number+unit tier would also
    // pick up Tafel slopes and bias values from the same sentence.
    for re in [&*OVERPOTENTIAL_ANCHORED, &*OVERPOTENTIAL_BARE] {
        let mut candidates = Vec::new();
        for sentence in &sentences {
            for caps in re.captures_iter(sentence) {
                let Ok(mut value) = caps[1].parse::<f64>() else {
                    continue;
                };
                // Normalize volts to millivolts
                if caps[2].eq_ignore_ascii_case("v") {
                    value *= 1000.0;
                }
                let (lo, hi) = OVERPOTENTIAL_RANGE_MV;
                if (lo..=hi).contains(&value) {
                    candidates.push(value);
                }
            }
        }
        if let Some(best) = candidates.into_iter().reduce(f64::min) {
            return Some(best);
        }
    }
    None
}

/// Extract all quantitative features from article text.
pub fn extract_quantitative(text: &str) -> QuantFeatures {
    QuantFeatures {
        overpotential_mv: extract_overpotential(text),
        current_density: first_numeric(text, &CURRENT_DENSITY),
        ph: first_numeric(text, &PH),
        temperature_c: first_numeric(text, &TEMPERATURE),
        tafel_slope_mv_per_dec: first_numeric(text, &TAFEL_SLOPE),
        faradaic_efficiency_pct: first_numeric(text, &FARADAIC_EFFICIENCY),
        turnover_frequency: first_numeric(text, &TURNOVER_FREQUENCY),
        stability_hours: first_numeric(text, &STABILITY),
    }
}

/// Text-level statistics used as context features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub unique_word_count: usize,
}

/// Word, sentence, and vocabulary statistics over the extracted text.
pub fn text_stats(text: &str) -> TextStats {
    let words: Vec<&str> = text.split_whitespace().collect();
    let sentence_count = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    let unique: FxHashSet<&str> = words.iter().copied().collect();
    TextStats {
        word_count: words.len(),
        sentence_count,
        avg_sentence_length: if sentence_count > 0 {
            words.len() as f64 / sentence_count as f64
        } else {
            0.0
        },
        unique_word_count: unique.len(),
    }
}
