//! oerex-extract - Feature extraction from article text
//!
//! Turns unstructured article prose into the structured, ML-ready feature
//! set: quantitative measurements (overpotential, Tafel slope, ...),
//! categorical entities (catalyst, substrate, electrolyte), vocabulary
//! presence/count features, and text statistics.

pub mod entities;
pub mod features;
pub mod text;
pub mod vocab;

pub use entities::{Entities, extract_entities};
pub use features::{QuantFeatures, TextStats, extract_quantitative, split_sentences, text_stats};
pub use text::{RawContent, TextError, extract_text};
