//! Filter module: the units of page transformation
//!
//! A filter receives the working HTML of one page, the shared page context and
//! the page record under construction. Filters never call each other; they only
//! communicate through the context and the record, so any of them can be
//! replaced in a [`FilterRegistry`] without touching the others.

pub mod builtin;
mod registry;
mod stack;

pub use registry::FilterRegistry;
pub use stack::{FilterStack, StackError};

use crate::config::ScraperOptions;
use crate::page::PageRecord;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors raised by a filter while processing one page
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// The page must be treated as ignored rather than failed
    #[error("Page ignored: {reason}")]
    Ignored { reason: String },

    #[error("No element matches '{selector}'")]
    MissingElement { selector: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),

    #[error("{0}")]
    Other(String),
}

impl FilterError {
    /// Builds the "ignore this page" signal
    pub fn ignore(reason: impl Into<String>) -> Self {
        Self::Ignored {
            reason: reason.into(),
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }
}

/// A named page transformation step
///
/// Any `Fn(&mut Document, &mut PageContext, &mut PageRecord) -> Result<(), FilterError>`
/// closure is a filter.
pub trait Filter: Send + Sync {
    fn apply(
        &self,
        doc: &mut Document,
        context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError>;
}

impl<F> Filter for F
where
    F: Fn(&mut Document, &mut PageContext, &mut PageRecord) -> Result<(), FilterError>
        + Send
        + Sync,
{
    fn apply(
        &self,
        doc: &mut Document,
        context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        self(doc, context, output)
    }
}

/// The working HTML of a page
///
/// Filters that need a tree parse it on demand with `scraper`; filters that
/// rewrite markup stream it through `lol_html` and store the result back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    html: String,
}

impl Document {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Replaces the working HTML
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    /// Parses the working HTML as a fragment
    pub fn fragment(&self) -> scraper::Html {
        scraper::Html::parse_fragment(&self.html)
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

/// Shared state threaded through every filter of one page
#[derive(Debug, Clone)]
pub struct PageContext {
    /// Merged scraper options
    pub options: Arc<ScraperOptions>,
    pub base_url: Url,
    pub root_url: Url,
    /// Final URL of the response being processed
    pub url: Url,
    /// Subpath of `url` relative to the base URL
    pub subpath: String,
    /// Content of the document's `<title>`, if any
    pub html_title: Option<String>,
    pub root_page: bool,
    /// Scratch values filters hand to later filters
    pub values: BTreeMap<String, String>,
}

impl PageContext {
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}
