//! Candidate extraction from search listing pages.
//!
//! The source's markup drifts, so candidate links are found through an
//! ordered selector fallback chain; the first selector yielding matches
//! wins. An empty candidate list is the end-of-results signal, never an
//! error.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const SITE_ROOT: &str = "https://www.nature.com";

/// Candidate link selectors, most specific first.
const LINK_SELECTORS: &[&str] = &[
    r#"a[data-track-action="view article"]"#,
    "h3 a",
    ".c-card__title a",
    r#"a[href*="/articles/"]"#,
];

static ARTICLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/articles/([^/?#]+)").expect("article id pattern compiles"));

/// One article candidate from a listing page, with whatever lightweight
/// metadata the result card carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub identifier: String,
    pub url: String,
    pub title: String,
    pub authors: String,
    pub year: Option<i32>,
    pub open_access: bool,
}

/// Build the listing-page URL for a search query and page number.
pub fn listing_url(base: &str, query: &str, date_range: &str, page: u32) -> anyhow::Result<String> {
    let url = url::Url::parse_with_params(
        base,
        &[
            ("q", query),
            ("date_range", date_range),
            ("page", &page.to_string()),
        ],
    )?;
    Ok(url.into())
}

/// Stable document identifier from an article URL, or `None` when the URL
/// does not point at an article.
pub fn identifier_from_url(url: &str) -> Option<String> {
    ARTICLE_ID
        .captures(url)
        .map(|caps| oerex_store::raw_cache::safe_stem(&caps[1]))
}

/// Extract the ordered, URL-deduplicated candidate list from a listing
/// page. Empty when the page has no more results.
pub fn extract_candidates(html: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for selector_str in LINK_SELECTORS {
        let selector = Selector::parse(selector_str).expect("listing selector parses");
        for link in document.select(&selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if !href.contains("/articles/") {
                continue;
            }
            let url = if href.starts_with('/') {
                format!("{SITE_ROOT}{href}")
            } else {
                href.to_string()
            };
            let Some(identifier) = identifier_from_url(&url) else {
                continue;
            };
            if !seen.insert(url.clone()) {
                continue;
            }

            let mut candidate = Candidate {
                identifier,
                url,
                ..Default::default()
            };
            candidate.title = link_text(link);
            if let Some(card) = card_ancestor(link) {
                fill_from_card(&mut candidate, card);
            }
            candidates.push(candidate);
        }
        if !candidates.is_empty() {
            log::debug!(
                "{} candidates via selector {selector_str}",
                candidates.len()
            );
            break;
        }
    }
    candidates
}

fn link_text(link: ElementRef) -> String {
    link.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Closest result-card ancestor of a candidate link.
///
/// Only the card block itself counts; BEM element classes such as
/// `c-card__title` sit on children of the card and must not match, or
/// the metadata search gets scoped to the title wrapper.
fn card_ancestor(link: ElementRef) -> Option<ElementRef> {
    link.ancestors().filter_map(ElementRef::wrap).find(|el| {
        el.value().name() == "article"
            || el.value().name() == "li"
            || el
                .value()
                .classes()
                .any(|c| c.starts_with("c-card") && !c.contains("__"))
    })
}

/// Listing metadata from the result card: authors, year, open-access badge.
fn fill_from_card(candidate: &mut Candidate, card: ElementRef) {
    static YEAR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"20\d{2}").expect("year pattern compiles"));

    let authors = Selector::parse(
        r#"[data-test="author-name"], .c-author-list__item, .app-author"#,
    )
    .expect("author selector parses");
    let names: Vec<String> = card
        .select(&authors)
        .map(link_text)
        .filter(|a| a.len() > 2)
        .collect();
    if !names.is_empty() {
        candidate.authors = names.join("; ");
    }

    let time = Selector::parse("time").expect("time selector parses");
    if let Some(el) = card.select(&time).next() {
        let datetime = el.value().attr("datetime").unwrap_or_default().to_string();
        let text = link_text(el);
        let haystack = if datetime.is_empty() { &text } else { &datetime };
        candidate.year = YEAR
            .find(haystack)
            .and_then(|m| m.as_str().parse().ok());
    }

    let badge = Selector::parse(r#".c-card__badge, [data-test="open-access"]"#)
        .expect("badge selector parses");
    candidate.open_access = card
        .select(&badge)
        .any(|el| link_text(el).to_lowercase().contains("open"));
}
