//! Run statistics and summary reporting.
//!
//! Two summaries are produced:
//! - `RunSummary`: acquisition + extraction over live search pages
//! - `ParseSummary`: re-extraction over the local raw cache

use std::time::Duration;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

/// Per-page counts collected while walking the search listing.
#[derive(Debug, Clone, Default)]
pub struct PageStats {
    pub page: u32,
    /// Article links found on the listing page
    pub candidates: usize,
    /// Skipped because the checkpoint already has a row
    pub already_processed: usize,
    /// Skipped after exhausting fetch retries or a terminal rejection
    pub fetch_failed: usize,
    pub elapsed: Duration,
}

impl PageStats {
    /// Log page completion (non-TTY mode only).
    pub fn log(&self) {
        log::info!(
            "page {}: {} candidates ({} cached, {} failed) [{:.1}s]",
            self.page,
            self.candidates,
            self.already_processed,
            self.fetch_failed,
            self.elapsed.as_secs_f64()
        );
    }
}

/// Aggregated statistics for one acquisition run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub pages_visited: usize,
    pub candidates: usize,
    pub already_processed: usize,
    pub fetch_failed: usize,
    pub paywalled: usize,
    /// Text below the minimum-length floor after extraction
    pub short_text: usize,
    /// Rows written to the feature table
    pub persisted: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn record_page(&mut self, page: &PageStats) {
        self.pages_visited += 1;
        self.candidates += page.candidates;
        self.already_processed += page.already_processed;
        self.fetch_failed += page.fetch_failed;
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Acquisition Run")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
                Cell::new("%").fg(Color::Cyan),
            ]);

        table.add_row(vec![
            Cell::new("Pages visited"),
            Cell::new(self.pages_visited.to_string()),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("Candidates"),
            Cell::new(self.candidates.to_string()),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("Already processed"),
            Cell::new(self.already_processed.to_string()),
            Cell::new(format!("{:.1}", pct(self.already_processed, self.candidates))),
        ]);
        table.add_row(vec![
            Cell::new("Fetch failed").fg(Color::Yellow),
            Cell::new(self.fetch_failed.to_string()).fg(Color::Yellow),
            Cell::new(format!("{:.1}", pct(self.fetch_failed, self.candidates))),
        ]);
        table.add_row(vec![
            Cell::new("Paywalled"),
            Cell::new(self.paywalled.to_string()),
            Cell::new(format!("{:.1}", pct(self.paywalled, self.candidates))),
        ]);
        table.add_row(vec![
            Cell::new("Text too short"),
            Cell::new(self.short_text.to_string()),
            Cell::new(format!("{:.1}", pct(self.short_text, self.candidates))),
        ]);
        table.add_row(vec![
            Cell::new("Rows persisted").fg(Color::Green),
            Cell::new(self.persisted.to_string()).fg(Color::Green),
            Cell::new(format!("{:.1}", pct(self.persisted, self.candidates)))
                .fg(Color::Green),
        ]);

        format!("\n{table}")
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "run complete: {} rows from {} candidates over {} pages [{:.1}s]",
            self.persisted,
            self.candidates,
            self.pages_visited,
            self.elapsed.as_secs_f64()
        );
    }
}

/// Aggregated statistics for a cache re-parse run.
#[derive(Debug, Default)]
pub struct ParseSummary {
    pub files_found: usize,
    pub read_failed: usize,
    pub short_text: usize,
    pub persisted: usize,
    pub elapsed: Duration,
}

impl ParseSummary {
    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Cache Re-parse")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);

        table.add_row(vec![
            Cell::new("Cached files"),
            Cell::new(self.files_found.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Read failed").fg(Color::Yellow),
            Cell::new(self.read_failed.to_string()).fg(Color::Yellow),
        ]);
        table.add_row(vec![
            Cell::new("Text too short"),
            Cell::new(self.short_text.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Rows persisted").fg(Color::Green),
            Cell::new(self.persisted.to_string()).fg(Color::Green),
        ]);

        format!("\n{table}")
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "re-parse complete: {} rows from {} files [{:.1}s]",
            self.persisted,
            self.files_found,
            self.elapsed.as_secs_f64()
        );
    }
}

/// Calculate percentage safely.
fn pct(part: usize, total: usize) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}
