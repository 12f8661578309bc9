//! Metadata extraction from article pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::listing::Candidate;

/// Metadata of one article page. Fields left empty/None fall back to the
/// listing-card values captured earlier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleMeta {
    pub title: String,
    pub authors: String,
    pub year: Option<i32>,
    pub open_access: bool,
    pub doi: Option<String>,
}

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"20\d{2}").expect("year pattern compiles"));

fn text_of(el: scraper::ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

/// Extract page-level metadata from article HTML.
pub fn extract_metadata(html: &str) -> ArticleMeta {
    let document = Html::parse_document(html);
    let mut meta = ArticleMeta::default();

    if let Some(title) = first_text(&document, "h1.c-article-title").or_else(|| {
        first_text(&document, "title")
    }) {
        meta.title = title;
    }

    let authors = Selector::parse(
        r#"[data-test="author-name"], .c-article-author-list a, .c-author-list a"#,
    )
    .expect("author selector parses");
    let names: Vec<String> = document
        .select(&authors)
        .map(text_of)
        .filter(|a| a.len() > 2)
        .collect();
    meta.authors = names.join("; ");

    let time = Selector::parse("time, [datetime]").expect("time selector parses");
    if let Some(el) = document.select(&time).next() {
        let datetime = el.value().attr("datetime").unwrap_or_default().to_string();
        let text = text_of(el);
        let haystack = if datetime.is_empty() { &text } else { &datetime };
        meta.year = YEAR.find(haystack).and_then(|m| m.as_str().parse().ok());
    }

    let oa = Selector::parse(r#".c-article-access, [data-test="open-access"], .open-access"#)
        .expect("access selector parses");
    meta.open_access = document.select(&oa).next().is_some();

    let doi = Selector::parse(r#"meta[name="citation_doi"]"#).expect("doi selector parses");
    meta.doi = document
        .select(&doi)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string);

    meta
}

impl ArticleMeta {
    /// Fill gaps from the listing-card candidate.
    pub fn merged_with(mut self, candidate: &Candidate) -> Self {
        if self.title.is_empty() {
            self.title = candidate.title.clone();
        }
        if self.authors.is_empty() {
            self.authors = candidate.authors.clone();
        }
        if self.year.is_none() {
            self.year = candidate.year;
        }
        self.open_access |= candidate.open_access;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html><head>
          <title>Fallback title | Nature</title>
          <meta name="citation_doi" content="10.1038/s41467-021-00001-x"/>
        </head><body>
          <h1 class="c-article-title">A highly active NiFe catalyst</h1>
          <ul class="c-article-author-list"><li>
            <a data-test="author-name">A. Alpha</a>
            <a data-test="author-name">B. Beta</a>
          </li></ul>
          <time datetime="2021-03-01">01 March 2021</time>
          <span data-test="open-access">Open Access</span>
        </body></html>"#;

    #[test]
    fn full_metadata() {
        let meta = extract_metadata(ARTICLE);
        assert_eq!(meta.title, "A highly active NiFe catalyst");
        assert_eq!(meta.authors, "A. Alpha; B. Beta");
        assert_eq!(meta.year, Some(2021));
        assert!(meta.open_access);
        assert_eq!(meta.doi.as_deref(), Some("10.1038/s41467-021-00001-x"));
    }

    #[test]
    fn title_falls_back_to_head() {
        let html = "<html><head><title>Only head title</title></head><body></body></html>";
        let meta = extract_metadata(html);
        assert_eq!(meta.title, "Only head title");
        assert!(!meta.open_access);
        assert_eq!(meta.doi, None);
    }

    #[test]
    fn merged_with_listing_fallback() {
        let candidate = Candidate {
            title: "Listing title".into(),
            authors: "C. Gamma".into(),
            year: Some(2019),
            open_access: true,
            ..Default::default()
        };
        let merged = ArticleMeta::default().merged_with(&candidate);
        assert_eq!(merged.title, "Listing title");
        assert_eq!(merged.authors, "C. Gamma");
        assert_eq!(merged.year, Some(2019));
        assert!(merged.open_access);
    }
}
