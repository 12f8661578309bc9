//! The feature table schema: one `FeatureRecord` per article.
//!
//! Fixed columns are listed once in `fixed_columns`; vocabulary columns
//! are generated from the static vocab tables, so schema and extraction
//! logic stay co-located. Serialization goes through `to_row`/`from_row`
//! with a header-index map, which lets newer code read older CSV files
//! that lack recently added columns (missing cell = null/zero).

use oerex_extract::features::{QuantFeatures, TextStats};
use oerex_extract::vocab;
use rustc_hash::FxHashMap;

/// One row of the output feature table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    // Identity
    pub identifier: String,
    pub url: String,
    pub title: String,
    /// Ordered author list, semicolon-joined for storage
    pub authors: String,
    pub year: Option<i32>,
    pub open_access: bool,
    // Provenance
    pub document_path: String,
    /// RFC 3339 acquisition time, empty when unknown
    pub fetched_at: String,
    pub text_length: usize,
    // Quantitative features
    pub quant: QuantFeatures,
    // Categorical features
    pub catalyst: Option<String>,
    pub substrate: Option<String>,
    pub electrolyte: Option<String>,
    pub electrolyte_concentration_m: Option<f64>,
    // Vocabulary features, parallel to the vocab tables
    pub element_counts: Vec<u32>,
    pub compound_flags: Vec<bool>,
    pub material_flags: Vec<bool>,
    pub morphology_flags: Vec<bool>,
    pub substrate_flags: Vec<bool>,
    pub mention_flags: Vec<bool>,
    // Text statistics
    pub stats: TextStats,
}

const FIXED_COLUMNS: &[&str] = &[
    "identifier",
    "url",
    "title",
    "authors",
    "year",
    "open_access",
    "document_path",
    "fetched_at",
    "text_length",
    "overpotential_mv",
    "current_density",
    "ph",
    "temperature_c",
    "tafel_slope_mv_per_dec",
    "faradaic_efficiency_pct",
    "turnover_frequency",
    "stability_hours",
    "catalyst",
    "substrate",
    "electrolyte",
    "electrolyte_concentration_m",
];

const STATS_COLUMNS: &[&str] = &[
    "word_count",
    "sentence_count",
    "avg_sentence_length",
    "unique_word_count",
];

/// Full column list in schema order: fixed, vocab-derived, stats.
pub fn columns() -> Vec<String> {
    let mut cols: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    for e in vocab::ELEMENTS {
        cols.push(format!("element_{e}"));
    }
    for c in vocab::COMPOUNDS {
        cols.push(format!("compound_{c}"));
    }
    for m in vocab::MATERIAL_TYPES {
        cols.push(format!("material_{m}"));
    }
    for m in vocab::MORPHOLOGIES {
        cols.push(format!("morphology_{m}"));
    }
    for s in vocab::SUBSTRATES {
        cols.push(format!("substrate_{s}"));
    }
    for t in vocab::PERFORMANCE_TERMS {
        cols.push(format!("mentions_{t}"));
    }
    cols.extend(STATS_COLUMNS.iter().map(|c| c.to_string()));
    cols
}

fn opt_f64(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn opt_str(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

fn flags(out: &mut Vec<String>, table: &[&str], values: &[bool]) {
    for i in 0..table.len() {
        let set = values.get(i).copied().unwrap_or(false);
        out.push(if set { "1" } else { "0" }.to_string());
    }
}

impl FeatureRecord {
    /// Serialize in `columns()` order. Null is the empty cell.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            self.identifier.clone(),
            self.url.clone(),
            self.title.clone(),
            self.authors.clone(),
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            (self.open_access as u8).to_string(),
            self.document_path.clone(),
            self.fetched_at.clone(),
            self.text_length.to_string(),
            opt_f64(self.quant.overpotential_mv),
            opt_f64(self.quant.current_density),
            opt_f64(self.quant.ph),
            opt_f64(self.quant.temperature_c),
            opt_f64(self.quant.tafel_slope_mv_per_dec),
            opt_f64(self.quant.faradaic_efficiency_pct),
            opt_f64(self.quant.turnover_frequency),
            opt_f64(self.quant.stability_hours),
            opt_str(&self.catalyst),
            opt_str(&self.substrate),
            opt_str(&self.electrolyte),
            opt_f64(self.electrolyte_concentration_m),
        ];
        for i in 0..vocab::ELEMENTS.len() {
            row.push(self.element_counts.get(i).copied().unwrap_or(0).to_string());
        }
        flags(&mut row, vocab::COMPOUNDS, &self.compound_flags);
        flags(&mut row, vocab::MATERIAL_TYPES, &self.material_flags);
        flags(&mut row, vocab::MORPHOLOGIES, &self.morphology_flags);
        flags(&mut row, vocab::SUBSTRATES, &self.substrate_flags);
        flags(&mut row, vocab::PERFORMANCE_TERMS, &self.mention_flags);
        row.push(self.stats.word_count.to_string());
        row.push(self.stats.sentence_count.to_string());
        row.push(self.stats.avg_sentence_length.to_string());
        row.push(self.stats.unique_word_count.to_string());
        row
    }

    /// Deserialize using a header-name -> position map. Columns absent
    /// from the file read as null/zero, so older tables load unchanged.
    pub fn from_row(header: &FxHashMap<String, usize>, row: &csv::StringRecord) -> Self {
        let cell = |name: &str| -> &str { header.get(name).and_then(|&i| row.get(i)).unwrap_or("") };
        let f64_cell = |name: &str| -> Option<f64> { cell(name).parse().ok() };
        let str_cell = |name: &str| -> Option<String> {
            let v = cell(name);
            (!v.is_empty()).then(|| v.to_string())
        };

        Self {
            identifier: cell("identifier").to_string(),
            url: cell("url").to_string(),
            title: cell("title").to_string(),
            authors: cell("authors").to_string(),
            year: cell("year").parse().ok(),
            open_access: cell("open_access") == "1",
            document_path: cell("document_path").to_string(),
            fetched_at: cell("fetched_at").to_string(),
            text_length: cell("text_length").parse().unwrap_or(0),
            quant: QuantFeatures {
                overpotential_mv: f64_cell("overpotential_mv"),
                current_density: f64_cell("current_density"),
                ph: f64_cell("ph"),
                temperature_c: f64_cell("temperature_c"),
                tafel_slope_mv_per_dec: f64_cell("tafel_slope_mv_per_dec"),
                faradaic_efficiency_pct: f64_cell("faradaic_efficiency_pct"),
                turnover_frequency: f64_cell("turnover_frequency"),
                stability_hours: f64_cell("stability_hours"),
            },
            catalyst: str_cell("catalyst"),
            substrate: str_cell("substrate"),
            electrolyte: str_cell("electrolyte"),
            electrolyte_concentration_m: f64_cell("electrolyte_concentration_m"),
            element_counts: vocab::ELEMENTS
                .iter()
                .map(|e| cell(&format!("element_{e}")).parse().unwrap_or(0))
                .collect(),
            compound_flags: vocab::COMPOUNDS
                .iter()
                .map(|c| cell(&format!("compound_{c}")) == "1")
                .collect(),
            material_flags: vocab::MATERIAL_TYPES
                .iter()
                .map(|m| cell(&format!("material_{m}")) == "1")
                .collect(),
            morphology_flags: vocab::MORPHOLOGIES
                .iter()
                .map(|m| cell(&format!("morphology_{m}")) == "1")
                .collect(),
            substrate_flags: vocab::SUBSTRATES
                .iter()
                .map(|s| cell(&format!("substrate_{s}")) == "1")
                .collect(),
            mention_flags: vocab::PERFORMANCE_TERMS
                .iter()
                .map(|t| cell(&format!("mentions_{t}")) == "1")
                .collect(),
            stats: TextStats {
                word_count: cell("word_count").parse().unwrap_or(0),
                sentence_count: cell("sentence_count").parse().unwrap_or(0),
                avg_sentence_length: cell("avg_sentence_length").parse().unwrap_or(0.0),
                unique_word_count: cell("unique_word_count").parse().unwrap_or(0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_unique_and_row_aligned() {
        let cols = columns();
        let mut seen = std::collections::HashSet::new();
        for c in &cols {
            assert!(seen.insert(c.clone()), "duplicate column {c}");
        }
        let rec = FeatureRecord::default();
        assert_eq!(rec.to_row().len(), cols.len());
    }

    #[test]
    fn row_round_trip() {
        let mut rec = FeatureRecord {
            identifier: "s41467-021-12345-z".into(),
            url: "https://www.nature.com/articles/s41467-021-12345-z".into(),
            title: "A very active catalyst".into(),
            authors: "A. Author; B. Author".into(),
            year: Some(2021),
            open_access: true,
            document_path: "raw/s41467-021-12345-z.html".into(),
            fetched_at: "2024-11-02T09:30:00+00:00".into(),
            text_length: 5120,
            catalyst: Some("NiFe-LDH nanosheets".into()),
            substrate: Some("nickel foam".into()),
            electrolyte: Some("KOH".into()),
            electrolyte_concentration_m: Some(1.0),
            ..Default::default()
        };
        rec.quant.overpotential_mv = Some(198.25);
        rec.quant.tafel_slope_mv_per_dec = Some(42.0);
        rec.element_counts = vec![3; vocab::ELEMENTS.len()];
        rec.compound_flags = vec![true; vocab::COMPOUNDS.len()];
        rec.material_flags = vec![false; vocab::MATERIAL_TYPES.len()];
        rec.morphology_flags = vec![true; vocab::MORPHOLOGIES.len()];
        rec.substrate_flags = vec![false; vocab::SUBSTRATES.len()];
        rec.mention_flags = vec![true; vocab::PERFORMANCE_TERMS.len()];
        rec.stats.word_count = 900;
        rec.stats.sentence_count = 50;
        rec.stats.avg_sentence_length = 18.0;
        rec.stats.unique_word_count = 400;

        let header: FxHashMap<String, usize> = columns()
            .into_iter()
            .enumerate()
            .map(|(i, c)| (c, i))
            .collect();
        let row = csv::StringRecord::from(rec.to_row());
        let back = FeatureRecord::from_row(&header, &row);
        assert_eq!(back, rec);
    }

    #[test]
    fn missing_columns_read_as_null() {
        // Older file with only the first two columns
        let mut header = FxHashMap::default();
        header.insert("identifier".to_string(), 0);
        header.insert("url".to_string(), 1);
        let row = csv::StringRecord::from(vec!["id-1", "https://example.test/a"]);
        let rec = FeatureRecord::from_row(&header, &row);
        assert_eq!(rec.identifier, "id-1");
        assert_eq!(rec.quant.overpotential_mv, None);
        assert_eq!(rec.catalyst, None);
        assert_eq!(rec.element_counts, vec![0; vocab::ELEMENTS.len()]);
    }

    #[test]
    fn default_vectors_serialize_as_zeroes() {
        // A default record has empty vocab vectors; to_row must still emit
        // one cell per vocab column
        let row = FeatureRecord::default().to_row();
        let cols = columns();
        let idx = cols.iter().position(|c| c == "element_Ni").unwrap();
        assert_eq!(row[idx], "0");
    }
}
