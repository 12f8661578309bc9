//! Configuration loading from TOML files.
//!
//! The file mirrors the run configuration in four sections:
//!
//! ```toml
//! [search]
//! query = "oxygen evolution reaction"
//! date_range = "2018-2025"
//! max_pages = 10
//!
//! [http]
//! request_delay_secs = 1.5
//! max_retries = 3
//!
//! [extract]
//! min_text_length = 200
//!
//! [storage]
//! raw_dir = "data/raw"
//! features_csv = "data/processed/features.csv"
//! limit_mb = 500.0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// On-disk configuration, all sections optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub search: SearchSection,
    pub http: HttpSection,
    pub extract: ExtractSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub base_url: String,
    pub query: String,
    pub date_range: String,
    pub max_pages: u32,
}

impl Default for SearchSection {
    fn default() -> Self {
        let d = oerex_nature::Config::default();
        Self {
            base_url: d.base_url,
            query: d.query,
            date_range: d.date_range,
            max_pages: d.max_pages,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub request_delay_secs: f64,
    pub jitter_frac: f64,
    pub max_retries: u32,
    pub backoff_base_secs: f64,
    pub rate_limit_wait_secs: f64,
    pub timeout_secs: f64,
    pub page_delay_secs: (f64, f64),
}

impl Default for HttpSection {
    fn default() -> Self {
        let f = oerex_core::FetcherConfig::default();
        Self {
            request_delay_secs: f.request_delay.as_secs_f64(),
            jitter_frac: f.jitter_frac,
            max_retries: f.max_retries,
            backoff_base_secs: f.backoff_base.as_secs_f64(),
            rate_limit_wait_secs: f.rate_limit_wait.as_secs_f64(),
            timeout_secs: f.timeout.as_secs_f64(),
            page_delay_secs: oerex_nature::Config::default().page_delay_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    pub min_text_length: usize,
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            min_text_length: oerex_nature::Config::default().min_text_length,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub raw_dir: PathBuf,
    pub features_csv: PathBuf,
    pub limit_mb: f64,
}

impl Default for StorageSection {
    fn default() -> Self {
        let d = oerex_nature::Config::default();
        Self {
            raw_dir: d.raw_dir,
            features_csv: d.features_csv,
            limit_mb: d.storage_limit_mb,
        }
    }
}

impl FileConfig {
    /// Load configuration from default locations.
    ///
    /// Search order:
    /// 1. ./oerex.toml (current directory)
    /// 2. ~/.config/oerex/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("oerex.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "oerex") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Assemble the run configuration the pipeline consumes.
    pub fn into_run_config(self) -> oerex_nature::Config {
        oerex_nature::Config {
            base_url: self.search.base_url,
            query: self.search.query,
            date_range: self.search.date_range,
            max_pages: self.search.max_pages,
            fetcher: oerex_core::FetcherConfig {
                request_delay: Duration::from_secs_f64(self.http.request_delay_secs),
                jitter_frac: self.http.jitter_frac,
                max_retries: self.http.max_retries,
                backoff_base: Duration::from_secs_f64(self.http.backoff_base_secs),
                rate_limit_wait: Duration::from_secs_f64(self.http.rate_limit_wait_secs),
                timeout: Duration::from_secs_f64(self.http.timeout_secs),
            },
            min_text_length: self.extract.min_text_length,
            raw_dir: self.storage.raw_dir,
            features_csv: self.storage.features_csv,
            storage_limit_mb: self.storage.limit_mb,
            page_delay_secs: self.http.page_delay_secs,
        }
    }
}
