//! Run configuration for the acquisition pipeline.

use std::path::PathBuf;

use oerex_core::FetcherConfig;

/// Everything a single pipeline run needs, assembled by the CLI from the
/// config file plus flag overrides.
#[derive(Debug, Clone)]
pub struct Config {
    /// Search endpoint, e.g. `https://www.nature.com/search`
    pub base_url: String,
    /// Search query string
    pub query: String,
    /// Publication date range, `YYYY-YYYY`
    pub date_range: String,
    /// Maximum listing pages to walk
    pub max_pages: u32,
    /// Fetch policy (delays, retries, timeouts)
    pub fetcher: FetcherConfig,
    /// Minimum usable extracted-text length in characters
    pub min_text_length: usize,
    /// Directory for cached raw documents
    pub raw_dir: PathBuf,
    /// Path of the feature-table CSV
    pub features_csv: PathBuf,
    /// Advisory cap on the raw cache, in megabytes
    pub storage_limit_mb: f64,
    /// Inter-page delay range in seconds, longer than the per-item delay
    pub page_delay_secs: (f64, f64),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.nature.com/search".to_string(),
            query: "oer".to_string(),
            date_range: "2015-2025".to_string(),
            max_pages: 5,
            fetcher: FetcherConfig::default(),
            min_text_length: 200,
            raw_dir: PathBuf::from("data/raw"),
            features_csv: PathBuf::from("data/processed/features.csv"),
            storage_limit_mb: 500.0,
            page_delay_secs: (3.0, 5.0),
        }
    }
}
