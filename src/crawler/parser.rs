//! Response body parser
//!
//! Turns a response body into the HTML the pipeline works on plus the
//! document title:
//! - Full documents (doctype or `<html>` root) yield their `<body>` content
//! - Fragments are passed through unchanged

use scraper::{Html, Selector};

/// Parsed response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBody {
    /// Working HTML for the pipeline
    pub html: String,

    /// The page title (from <title> tag)
    pub title: Option<String>,
}

/// Parses a response body
///
/// # Example
///
/// ```
/// use doc_harvest::crawler::parse_body;
///
/// let parsed = parse_body("<!doctype html><title>Intro</title><div>Test</div>");
/// assert_eq!(parsed.html, "<div>Test</div>");
/// assert_eq!(parsed.title.as_deref(), Some("Intro"));
/// ```
pub fn parse_body(body: &str) -> ParsedBody {
    if !is_document(body) {
        return ParsedBody {
            html: body.to_string(),
            title: None,
        };
    }

    let document = Html::parse_document(body);

    let html = Selector::parse("body")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|body| body.inner_html())
        })
        .unwrap_or_default();

    ParsedBody {
        html,
        title: extract_title(&document),
    }
}

/// Returns true if the body is a full document rather than a fragment
fn is_document(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(9).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html") || head.starts_with("<?xml")
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
