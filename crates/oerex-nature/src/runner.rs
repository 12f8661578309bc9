//! Pipeline orchestration: listing walk, acquisition, extraction, persistence.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use rand::Rng;

use oerex_core::fetch::{FetchError, Fetcher, RawDocument};
use oerex_core::progress::SharedProgress;
use oerex_core::shutdown::is_shutdown_requested;
use oerex_extract::text::{RawContent, TextError, extract_text};
use oerex_extract::{extract_entities, extract_quantitative, text_stats, vocab};
use oerex_store::{Checkpoint, FeatureRecord, RawCache};

use crate::article::{ArticleMeta, extract_metadata};
use crate::config::Config;
use crate::coverage::FieldCompleteness;
use crate::listing::{Candidate, extract_candidates, listing_url};
use crate::paywall::{Access, classify};
use crate::stats::{PageStats, ParseSummary, RunSummary};

/// What the run does with each fetched article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Acquire, extract features, persist rows
    Full,
    /// Acquire and cache raw documents only
    AcquireOnly,
}

/// Build a feature row from extracted article text and merged metadata.
pub fn build_record(
    candidate: &Candidate,
    meta: &ArticleMeta,
    document_path: &str,
    text: &str,
) -> FeatureRecord {
    let entities = extract_entities(text);
    FeatureRecord {
        identifier: candidate.identifier.clone(),
        url: candidate.url.clone(),
        title: meta.title.clone(),
        authors: meta.authors.clone(),
        year: meta.year,
        open_access: meta.open_access,
        document_path: document_path.to_string(),
        fetched_at: chrono::Utc::now().to_rfc3339(),
        text_length: text.len(),
        quant: extract_quantitative(text),
        catalyst: entities.catalyst,
        substrate: entities.substrate,
        electrolyte: entities.electrolyte,
        electrolyte_concentration_m: entities.electrolyte_concentration_m,
        element_counts: vocab::ELEMENT_MATCHER.counts(text),
        compound_flags: vocab::COMPOUND_MATCHER.presence(text),
        material_flags: vocab::MATERIAL_MATCHER.presence(text),
        morphology_flags: vocab::MORPHOLOGY_MATCHER.presence(text),
        substrate_flags: vocab::SUBSTRATE_MATCHER.presence(text),
        mention_flags: vocab::PERFORMANCE_MATCHER.presence(text),
        stats: text_stats(text),
    }
}

fn flush_logged(checkpoint: &Checkpoint) {
    if let Err(e) = checkpoint.flush() {
        log::error!("checkpoint flush failed: {e:#}");
    }
}

fn sleep_between_pages(range: (f64, f64)) {
    let (lo, hi) = range;
    let secs = if hi > lo {
        rand::thread_rng().gen_range(lo..=hi)
    } else {
        lo
    };
    std::thread::sleep(std::time::Duration::from_secs_f64(secs));
}

/// Walk the search listing and process every new article.
///
/// A listing failure on page 1 aborts the run (the query itself is broken);
/// a failure on a later page ends paging normally, since running off the end
/// of the result set looks the same as a transient error.
pub fn run(config: &Config, mode: Mode, progress: &SharedProgress) -> anyhow::Result<ExitCode> {
    let fetcher = Fetcher::new(config.fetcher.clone());
    let (exit, _) = run_with(config, mode, progress, |url| fetcher.fetch(url))?;
    Ok(exit)
}

/// Run loop over an injected fetch function (unit-testable without a
/// network). Returns the summary alongside the exit code.
fn run_with(
    config: &Config,
    mode: Mode,
    progress: &SharedProgress,
    mut fetch_fn: impl FnMut(&str) -> Result<RawDocument, FetchError>,
) -> anyhow::Result<(ExitCode, RunSummary)> {
    let start = Instant::now();

    let cache = RawCache::new(&config.raw_dir)?;
    let mut checkpoint = Checkpoint::load(&config.features_csv)
        .with_context(|| format!("loading checkpoint {}", config.features_csv.display()))?;
    log::info!(
        "checkpoint has {} rows, raw cache {:.1} MB",
        checkpoint.len(),
        cache.size_mb()
    );

    let mut summary = RunSummary::default();
    let mut interrupted = false;

    'pages: for page in 1..=config.max_pages {
        if is_shutdown_requested() {
            interrupted = true;
            break;
        }

        let page_start = Instant::now();
        let url = listing_url(&config.base_url, &config.query, &config.date_range, page)?;
        let stage = progress.stage_line(&format!("page {page}/{}", config.max_pages));

        let listing = match fetch_fn(&url) {
            Ok(doc) => doc,
            Err(e) if page == 1 => {
                stage.finish_and_clear();
                return Err(e).with_context(|| format!("fetching first listing page {url}"));
            }
            Err(e) => {
                stage.finish_and_clear();
                log::warn!("page {page} unavailable ({e}), ending paging");
                break;
            }
        };

        let candidates = extract_candidates(&listing.body);
        if candidates.is_empty() {
            stage.finish_and_clear();
            log::info!("page {page}: no article links, ending paging");
            break;
        }

        let mut page_stats = PageStats {
            page,
            candidates: candidates.len(),
            ..Default::default()
        };
        let bar = progress.item_bar(&format!("page {page}"), candidates.len() as u64);

        for candidate in &candidates {
            bar.inc(1);
            if is_shutdown_requested() {
                interrupted = true;
                break;
            }
            if checkpoint.contains(&candidate.identifier) {
                page_stats.already_processed += 1;
                continue;
            }

            match process_candidate(
                config, mode, &mut fetch_fn, &cache, candidate, &mut summary,
            ) {
                Ok(Some(record)) => {
                    checkpoint.upsert(record);
                    flush_logged(&checkpoint);
                    summary.persisted += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    page_stats.fetch_failed += 1;
                    log::warn!("{}: {e}", candidate.identifier);
                }
            }

            if !cache.within_limit(config.storage_limit_mb) {
                log::warn!(
                    "raw cache at {:.1} MB exceeds the {:.0} MB limit, stopping acquisition",
                    cache.size_mb(),
                    config.storage_limit_mb
                );
                bar.finish_and_clear();
                page_stats.elapsed = page_start.elapsed();
                summary.record_page(&page_stats);
                break 'pages;
            }
        }

        bar.finish_and_clear();
        stage.finish_and_clear();
        page_stats.elapsed = page_start.elapsed();
        if !progress.is_tty() {
            page_stats.log();
        }
        summary.record_page(&page_stats);

        if interrupted {
            break;
        }
        if page < config.max_pages {
            sleep_between_pages(config.page_delay_secs);
        }
    }

    flush_logged(&checkpoint);
    summary.elapsed = start.elapsed();

    if progress.is_tty() {
        println!("{}", summary.format_table());
        if mode == Mode::Full && !checkpoint.is_empty() {
            println!("{}", FieldCompleteness::compute(checkpoint.records()).format_table());
        }
    } else {
        summary.log();
        if mode == Mode::Full && !checkpoint.is_empty() {
            FieldCompleteness::compute(checkpoint.records()).log();
        }
    }

    if interrupted {
        log::warn!("interrupted, checkpoint flushed");
        return Ok((ExitCode::from(130), summary));
    }
    Ok((ExitCode::SUCCESS, summary))
}

/// Fetch, cache, and (in full mode) extract one article.
///
/// `Ok(None)` means the article was legitimately skipped: paywalled, too
/// short, or acquire-only mode. `Err` means the fetch itself failed.
/// The fetch function already delays before each attempt.
fn process_candidate(
    config: &Config,
    mode: Mode,
    fetch_fn: &mut impl FnMut(&str) -> Result<RawDocument, FetchError>,
    cache: &RawCache,
    candidate: &Candidate,
    summary: &mut RunSummary,
) -> anyhow::Result<Option<FeatureRecord>> {
    let (html, document_path) = match cache.find(&candidate.identifier) {
        Some(path) => {
            let body = std::fs::read_to_string(&path)
                .with_context(|| format!("reading cached {}", path.display()))?;
            (body, path)
        }
        None => {
            let doc = fetch_fn(&candidate.url)
                .with_context(|| format!("fetching {}", candidate.url))?;

            if classify(&doc.body) == Access::Paywalled {
                summary.paywalled += 1;
                log::debug!("{}: paywalled, skipping", candidate.identifier);
                return Ok(None);
            }

            let path = cache.store_html(&candidate.identifier, &doc.body)?;
            (doc.body, path)
        }
    };

    if mode == Mode::AcquireOnly {
        return Ok(None);
    }

    if classify(&html) == Access::Paywalled {
        summary.paywalled += 1;
        return Ok(None);
    }

    let text = match extract_text(RawContent::Html(&html), config.min_text_length) {
        Ok(text) => text,
        Err(TextError::TooShort { len, min }) => {
            summary.short_text += 1;
            log::debug!(
                "{}: extracted text too short ({len} < {min})",
                candidate.identifier
            );
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let meta = extract_metadata(&html).merged_with(candidate);
    let path_str = document_path.to_string_lossy().into_owned();
    Ok(Some(build_record(candidate, &meta, &path_str, &text)))
}

/// Re-extract features from every document in the raw cache.
///
/// Metadata comes from the cached HTML itself (plus any existing checkpoint
/// row for the same identifier), so no network access happens here.
pub fn parse_existing(config: &Config, progress: &SharedProgress) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let mut checkpoint = Checkpoint::load(&config.features_csv)
        .with_context(|| format!("loading checkpoint {}", config.features_csv.display()))?;

    let mut files = Vec::new();
    for ext in ["html", "pdf"] {
        let pattern = config.raw_dir.join(format!("*.{ext}"));
        let pattern_str = pattern
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non-UTF8 path: {:?}", config.raw_dir))?;
        files.extend(glob::glob(pattern_str)?.filter_map(Result::ok));
    }

    let mut summary = ParseSummary {
        files_found: files.len(),
        ..Default::default()
    };
    if files.is_empty() {
        log::warn!("no cached documents under {}", config.raw_dir.display());
    }

    let bar = progress.item_bar("re-parse", files.len() as u64);
    let mut interrupted = false;

    for path in &files {
        bar.inc(1);
        if is_shutdown_requested() {
            interrupted = true;
            break;
        }
        match parse_one(config, &mut checkpoint, path) {
            Ok(true) => summary.persisted += 1,
            Ok(false) => summary.short_text += 1,
            Err(e) => {
                summary.read_failed += 1;
                log::warn!("{}: {e:#}", path.display());
            }
        }
    }
    bar.finish_and_clear();

    flush_logged(&checkpoint);
    summary.elapsed = start.elapsed();

    if progress.is_tty() {
        println!("{}", summary.format_table());
        if !checkpoint.is_empty() {
            println!("{}", FieldCompleteness::compute(checkpoint.records()).format_table());
        }
    } else {
        summary.log();
    }

    if interrupted {
        return Ok(ExitCode::from(130));
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_one(config: &Config, checkpoint: &mut Checkpoint, path: &Path) -> anyhow::Result<bool> {
    let identifier = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("unusable file name"))?
        .to_string();

    let is_pdf = path.extension().is_some_and(|e| e == "pdf");
    let (html, text) = if is_pdf {
        let bytes = std::fs::read(path)?;
        let text = match extract_text(RawContent::Pdf(&bytes), config.min_text_length) {
            Ok(text) => text,
            Err(TextError::TooShort { .. }) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        (String::new(), text)
    } else {
        let html = std::fs::read_to_string(path)?;
        let text = match extract_text(RawContent::Html(&html), config.min_text_length) {
            Ok(text) => text,
            Err(TextError::TooShort { .. }) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        (html, text)
    };

    // Reuse the identity an earlier run recorded for this document; the
    // cached page no longer knows its original search-listing context.
    let existing = checkpoint
        .records()
        .iter()
        .find(|r| r.identifier == identifier)
        .cloned();
    let candidate = Candidate {
        identifier: identifier.clone(),
        url: existing.as_ref().map(|r| r.url.clone()).unwrap_or_default(),
        title: existing.as_ref().map(|r| r.title.clone()).unwrap_or_default(),
        authors: existing
            .as_ref()
            .map(|r| r.authors.clone())
            .unwrap_or_default(),
        year: existing.as_ref().and_then(|r| r.year),
        open_access: existing.as_ref().is_some_and(|r| r.open_access),
    };
    let meta = extract_metadata(&html).merged_with(&candidate);
    let path_str = path.to_string_lossy().into_owned();

    let mut record = build_record(&candidate, &meta, &path_str, &text);
    // Re-parsing does not re-fetch; keep the original acquisition time.
    if let Some(prev) = existing {
        record.fetched_at = prev.fetched_at;
    }
    checkpoint.upsert(record);
    Ok(true)
}
