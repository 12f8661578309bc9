//! Paywall detection over raw article HTML.
//!
//! Heuristic phrase scan, negative signals first: any access-barrier phrase
//! marks the page paywalled outright. Full-text markers are consulted only
//! on pages without a barrier phrase, and pages with neither signal are
//! treated as open, so borderline articles are attempted rather than
//! skipped.

const BARRIER_PHRASES: &[&str] = &[
    "purchase article",
    "buy article",
    "access denied",
    "you do not have access",
    "sign in to read",
    "log in to read",
    "subscribe to this journal",
    "institutional access",
    "rent or buy",
];

const FULL_TEXT_PHRASES: &[&str] = &["download pdf", "supplementary information"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Open,
    Paywalled,
}

/// Classify an article page as open or paywalled.
pub fn classify(html: &str) -> Access {
    let lower = html.to_lowercase();

    // Barrier phrases win outright. Subscription pages still advertise a
    // purchasable PDF, so a download link cannot rescue a barred page.
    if BARRIER_PHRASES.iter().any(|p| lower.contains(p)) {
        return Access::Paywalled;
    }

    if FULL_TEXT_PHRASES.iter().any(|p| lower.contains(p)) {
        return Access::Open;
    }

    // Neither signal: attempt the article rather than skip it.
    Access::Open
}
