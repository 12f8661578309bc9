//! Run and acquire subcommands - walk the search listing and process articles.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use oerex_core::SharedProgress;
use oerex_nature::Mode;

use crate::config::FileConfig;

/// Flags shared by `run` and `acquire`; each overrides one config field.
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Publication date range (YYYY-YYYY)
    #[arg(long)]
    pub date_range: Option<String>,

    /// Maximum listing pages to walk
    #[arg(short = 'p', long)]
    pub max_pages: Option<u32>,

    /// Directory for cached raw documents
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Feature-table CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Raw cache size cap in megabytes
    #[arg(long)]
    pub storage_limit_mb: Option<f64>,

    /// Minimum usable extracted-text length in characters
    #[arg(long)]
    pub min_text_length: Option<usize>,
}

impl SearchArgs {
    /// Fold flag overrides into the file-derived configuration.
    pub fn apply(self, mut config: oerex_nature::Config) -> oerex_nature::Config {
        if let Some(query) = self.query {
            config.query = query;
        }
        if let Some(date_range) = self.date_range {
            config.date_range = date_range;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(raw_dir) = self.raw_dir {
            config.raw_dir = raw_dir;
        }
        if let Some(output) = self.output {
            config.features_csv = output;
        }
        if let Some(limit) = self.storage_limit_mb {
            config.storage_limit_mb = limit;
        }
        if let Some(min_len) = self.min_text_length {
            config.min_text_length = min_len;
        }
        config
    }
}

pub fn run(
    args: SearchArgs,
    file: &FileConfig,
    mode: Mode,
    progress: &SharedProgress,
) -> Result<ExitCode> {
    let config = args.apply(file.clone().into_run_config());

    log::info!("Searching {} for {:?}", config.base_url, config.query);
    log::info!(
        "  Pages: up to {}, dates {}",
        config.max_pages,
        config.date_range
    );
    log::info!("  Raw cache: {}", config.raw_dir.display());
    log::info!("  Features: {}", config.features_csv.display());

    oerex_nature::run(&config, mode, progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_fields() {
        let args = SearchArgs {
            query: Some("water splitting".into()),
            max_pages: Some(2),
            output: Some(PathBuf::from("/tmp/features.csv")),
            ..Default::default()
        };
        let config = args.apply(oerex_nature::Config::default());
        assert_eq!(config.query, "water splitting");
        assert_eq!(config.max_pages, 2);
        assert_eq!(config.features_csv, PathBuf::from("/tmp/features.csv"));
        // untouched fields keep their defaults
        assert_eq!(config.date_range, oerex_nature::Config::default().date_range);
    }
}
