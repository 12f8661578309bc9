//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: spinner status lines per pipeline stage and per article.
//! Non-TTY mode: hidden bars, logs carry the activity.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {prefix:<12.dim} {wide_msg}")
        .expect("invalid template")
}

fn counter_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:<12.dim} {bar:30.green/dim} {pos:>4}/{len:4} {wide_msg:.dim}")
        .expect("invalid template")
        .progress_chars("=>-")
}

/// Central progress context managing multi-progress status lines.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

pub type SharedProgress = Arc<ProgressContext>;

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }

    /// Spinner status line for an active stage.
    ///
    /// Update with `pb.set_message(...)`; call `pb.finish_and_clear()`
    /// when the stage completes. Hidden (no-op) outside a TTY.
    pub fn stage_line(&self, prefix: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(spinner_style());
        pb.set_prefix(prefix.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// Position bar over a known item count (candidates on a listing page).
    pub fn item_bar(&self, prefix: &str, total: u64) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(counter_style());
        pb.set_prefix(prefix.to_string());
        pb
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators (1234567 -> "1,234,567")
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
