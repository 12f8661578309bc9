//! Closed vocabularies for composition and material features.
//!
//! Every feature column derived from these tables is generated by a
//! data-driven loop (one word-boundary scan per term), so adding a term
//! here is all it takes to grow the feature set.

use std::sync::LazyLock;

use regex::Regex;

/// Chemical elements relevant to OER catalysis, counted per occurrence.
pub static ELEMENTS: &[&str] = &[
    "Ni", "Co", "Fe", "Mn", "Cu", "Zn", "Mo", "W", "V", "Cr", "Ru", "Ir", "Pt", "Pd", "Sn", "Pb",
    "Ti", "Nb", "Ta", "Zr", "Ce", "La", "Sr", "Ba",
];

/// Specific compounds reported as OER catalysts.
pub static COMPOUNDS: &[&str] = &[
    "MoS2", "NiFe-LDH", "Co3O4", "NiO", "Fe2O3", "NiCo2O4", "NiMoO4", "NiFe2O4", "CoOOH",
    "Ni(OH)2",
];

/// Material classes.
pub static MATERIAL_TYPES: &[&str] = &[
    "oxide",
    "hydroxide",
    "sulfide",
    "phosphide",
    "nitride",
    "carbide",
    "perovskite",
    "spinel",
    "amorphous",
];

/// Morphology descriptors.
pub static MORPHOLOGIES: &[&str] = &[
    "nanorods",
    "nanosheets",
    "nanowires",
    "nanoparticles",
    "nanoflakes",
    "nanotubes",
    "porous",
    "hollow",
    "core-shell",
];

/// Known conductive substrates.
pub static SUBSTRATES: &[&str] = &[
    "nickel foam",
    "carbon cloth",
    "graphene",
    "ITO",
    "FTO",
    "copper foil",
    "stainless steel",
    "carbon paper",
    "carbon nanotube",
    "CNT",
];

/// Electrolytes, in priority order for closed-vocabulary resolution.
pub static ELECTROLYTES: &[&str] = &[
    "KOH",
    "NaOH",
    "H2SO4",
    "HCl",
    "H3PO4",
    "Na2CO3",
    "LiOH",
    "NH4Cl",
    "phosphate buffer",
];

/// Performance-discussion terms recorded as mention flags.
pub static PERFORMANCE_TERMS: &[&str] = &[
    "current density",
    "Tafel slope",
    "exchange current",
    "stability",
    "onset potential",
    "overpotential",
    "activity",
];

/// Case-insensitive word-boundary matcher over a static term table.
///
/// Regexes are compiled once per table; match order is table order, which
/// doubles as priority order for `first_match`.
pub struct VocabMatcher {
    terms: &'static [&'static str],
    regexes: Vec<Regex>,
}

impl VocabMatcher {
    fn new(terms: &'static [&'static str]) -> Self {
        let regexes = terms
            .iter()
            .map(|t| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(t)))
                    .expect("vocabulary term compiles")
            })
            .collect();
        Self { terms, regexes }
    }

    pub fn terms(&self) -> &'static [&'static str] {
        self.terms
    }

    /// Occurrence count per term, parallel to `terms()`.
    pub fn counts(&self, text: &str) -> Vec<u32> {
        self.regexes
            .iter()
            .map(|re| re.find_iter(text).count() as u32)
            .collect()
    }

    /// Presence flag per term, parallel to `terms()`.
    pub fn presence(&self, text: &str) -> Vec<bool> {
        self.regexes.iter().map(|re| re.is_match(text)).collect()
    }

    /// First term (in table order) appearing in the text.
    pub fn first_match(&self, text: &str) -> Option<&'static str> {
        self.regexes
            .iter()
            .position(|re| re.is_match(text))
            .map(|i| self.terms[i])
    }

    /// Whether the candidate span contains any vocabulary term as a whole
    /// word. Used to validate structural captures; a plain substring test
    /// would let single-letter elements (V, W) validate almost any span.
    pub fn validates(&self, candidate: &str) -> bool {
        self.regexes.iter().any(|re| re.is_match(candidate))
    }
}

pub static ELEMENT_MATCHER: LazyLock<VocabMatcher> = LazyLock::new(|| VocabMatcher::new(ELEMENTS));
pub static COMPOUND_MATCHER: LazyLock<VocabMatcher> =
    LazyLock::new(|| VocabMatcher::new(COMPOUNDS));
pub static MATERIAL_MATCHER: LazyLock<VocabMatcher> =
    LazyLock::new(|| VocabMatcher::new(MATERIAL_TYPES));
pub static MORPHOLOGY_MATCHER: LazyLock<VocabMatcher> =
    LazyLock::new(|| VocabMatcher::new(MORPHOLOGIES));
pub static SUBSTRATE_MATCHER: LazyLock<VocabMatcher> =
    LazyLock::new(|| VocabMatcher::new(SUBSTRATES));
pub static ELECTROLYTE_MATCHER: LazyLock<VocabMatcher> =
    LazyLock::new(|| VocabMatcher::new(ELECTROLYTES));
pub static PERFORMANCE_MATCHER: LazyLock<VocabMatcher> =
    LazyLock::new(|| VocabMatcher::new(PERFORMANCE_TERMS));

/// Terms accepted as catalyst names: specific compounds, then elements,
/// then material classes.
pub static CATALYST_MATCHER: LazyLock<VocabMatcher> = LazyLock::new(|| {
    static TERMS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
        COMPOUNDS
            .iter()
            .chain(ELEMENTS.iter())
            .chain(MATERIAL_TYPES.iter())
            .copied()
            .collect()
    });
    VocabMatcher::new(&TERMS)
});
