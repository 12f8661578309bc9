//! oerex - incremental feature extraction from Nature search results
//!
//! Walks journal search listings, caches open-access article pages, and
//! distills each one into a row of ML-ready electrochemistry features.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use oerex_nature::Mode;

mod cmd;
mod config;

use config::FileConfig;

#[derive(Parser)]
#[command(name = "oerex")]
#[command(about = "Incremental feature extraction from Nature search results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./oerex.toml or ~/.config/oerex/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Acquire articles and extract features in one pass
    Run(cmd::run::SearchArgs),
    /// Acquire and cache raw article pages only
    Acquire(cmd::run::SearchArgs),
    /// Re-extract features from the local raw cache
    Parse(cmd::parse::ParseArgs),
    /// Field completeness of the persisted feature table
    Coverage(cmd::coverage::CoverageArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(oerex_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    oerex_core::init_logging(quiet, cli.debug, multi);

    oerex_core::register_signal_handlers()?;

    let file = if let Some(path) = cli.config {
        FileConfig::from_file(&path)?
    } else {
        FileConfig::load()?
    };

    match cli.command {
        Command::Run(args) => cmd::run::run(args, &file, Mode::Full, &progress),
        Command::Acquire(args) => cmd::run::run(args, &file, Mode::AcquireOnly, &progress),
        Command::Parse(args) => cmd::parse::run(args, &file, &progress),
        Command::Coverage(args) => cmd::coverage::run(args, &file),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let config = file.into_run_config();
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Search URL", &config.base_url]);
            table.add_row(vec!["Query", &config.query]);
            table.add_row(vec!["Date range", &config.date_range]);
            table.add_row(vec!["Max pages", &config.max_pages.to_string()]);
            table.add_row(vec![
                "Request delay",
                &format!("{:.1}s", config.fetcher.request_delay.as_secs_f64()),
            ]);
            table.add_row(vec!["Max retries", &config.fetcher.max_retries.to_string()]);
            table.add_row(vec![
                "Timeout",
                &format!("{:.0}s", config.fetcher.timeout.as_secs_f64()),
            ]);
            table.add_row(vec![
                "Min text length",
                &config.min_text_length.to_string(),
            ]);
            table.add_row(vec!["Raw cache", &config.raw_dir.display().to_string()]);
            table.add_row(vec![
                "Feature table",
                &config.features_csv.display().to_string(),
            ]);
            table.add_row(vec![
                "Storage limit",
                &format!("{:.0} MB", config.storage_limit_mb),
            ]);

            eprintln!("\n{table}");
            Ok(ExitCode::SUCCESS)
        }
    }
}
