//! Coverage subcommand - field completeness of the persisted feature table.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use oerex_nature::coverage::FieldCompleteness;
use oerex_store::Checkpoint;

use crate::config::FileConfig;

#[derive(Args, Debug)]
pub struct CoverageArgs {
    /// Feature-table CSV path
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: CoverageArgs, file: &FileConfig) -> Result<ExitCode> {
    let path = args
        .input
        .unwrap_or_else(|| file.storage.features_csv.clone());
    let checkpoint = Checkpoint::load(&path)
        .with_context(|| format!("loading feature table {}", path.display()))?;

    if checkpoint.is_empty() {
        log::warn!("feature table {} is empty", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let stats = FieldCompleteness::compute(checkpoint.records());
    println!("{}", stats.format_table());
    Ok(ExitCode::SUCCESS)
}
