//! Parse subcommand - re-extract features from the local raw cache.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use oerex_core::SharedProgress;

use crate::config::FileConfig;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Directory of cached raw documents
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Feature-table CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum usable extracted-text length in characters
    #[arg(long)]
    pub min_text_length: Option<usize>,
}

pub fn run(args: ParseArgs, file: &FileConfig, progress: &SharedProgress) -> Result<ExitCode> {
    let mut config = file.clone().into_run_config();
    if let Some(raw_dir) = args.raw_dir {
        config.raw_dir = raw_dir;
    }
    if let Some(output) = args.output {
        config.features_csv = output;
    }
    if let Some(min_len) = args.min_text_length {
        config.min_text_length = min_len;
    }

    log::info!("Re-parsing raw cache {}", config.raw_dir.display());
    log::info!("  Features: {}", config.features_csv.display());

    oerex_nature::parse_existing(&config, progress)
}
