//! Plain-text extraction from fetched documents.
//!
//! HTML documents go through a fallback chain of content-region selectors,
//! most specific first, down to "all long-enough paragraphs". PDF
//! documents are concatenated in page order. Too-short output is a normal
//! skip outcome, not a failure.

use scraper::{Html, Selector};

/// Content-region selectors tried in order; the first region yielding
/// enough text wins.
const CONTENT_SELECTORS: &[&str] = &[
    "div.c-article-body",
    "article",
    "main",
    ".article-content",
    ".c-article-main-content",
];

/// A selected region must carry at least this much text to be accepted.
const REGION_MIN_CHARS: usize = 500;

/// Paragraphs shorter than this are dropped in the fallback path.
const PARAGRAPH_MIN_CHARS: usize = 50;

/// Raw bytes/text of a fetched document, tagged by format.
pub enum RawContent<'a> {
    Html(&'a str),
    Pdf(&'a [u8]),
}

/// Why no usable text came out of a document.
#[derive(Debug)]
pub enum TextError {
    /// Extraction worked but the result is below the minimum length.
    /// Callers skip the document; this is not exceptional.
    TooShort { len: usize, min: usize },
    /// The PDF library could not decode the document.
    Pdf(String),
}

impl std::fmt::Display for TextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort { len, min } => {
                write!(f, "extracted text too short: {len} chars (minimum {min})")
            }
            Self::Pdf(msg) => write!(f, "PDF extraction failed: {msg}"),
        }
    }
}

impl std::error::Error for TextError {}

/// Collapse an element's text nodes into single-space-separated prose.
fn element_text(element: scraper::ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Main prose text of an HTML article page.
fn html_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let selector = Selector::parse(selector_str).expect("content selector parses");
        if let Some(region) = document.select(&selector).next() {
            let text = element_text(region);
            if text.len() > REGION_MIN_CHARS {
                log::debug!("content region {selector_str}: {} chars", text.len());
                return text;
            }
        }
    }
    log::debug!("no content region matched, falling back to paragraphs");

    // Fallback: every paragraph long enough to be prose
    let p = Selector::parse("p").expect("p selector parses");
    let parts: Vec<String> = document
        .select(&p)
        .map(element_text)
        .filter(|t| t.len() > PARAGRAPH_MIN_CHARS)
        .collect();
    parts.join(" ")
}

/// Per-page PDF text in page order.
fn pdf_text(bytes: &[u8]) -> Result<String, TextError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| TextError::Pdf(e.to_string()))
}

/// Extract plain text from a fetched document, rejecting results shorter
/// than `min_len` characters.
pub fn extract_text(content: RawContent<'_>, min_len: usize) -> Result<String, TextError> {
    let text = match content {
        RawContent::Html(html) => html_text(html),
        RawContent::Pdf(bytes) => pdf_text(bytes)?,
    };
    if text.len() < min_len {
        return Err(TextError::TooShort {
            len: text.len(),
            min: min_len,
        });
    }
    Ok(text)
}
