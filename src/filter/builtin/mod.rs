//! Built-in core filters
//!
//! These are the generic filters of the default stacks. Site-specific filters
//! are registered next to them under their own names.

mod container;
mod entries;
mod links;
mod text;

pub use container::{CleanHtmlFilter, ContainerFilter};
pub use entries::{EntriesFilter, TitleFilter};
pub use links::{InternalUrlsFilter, NormalizeUrlsFilter};
pub use text::{AttributionFilter, CleanTextFilter, InnerHtmlFilter};

use crate::filter::{FilterError, FilterRegistry};
use lol_html::{HtmlRewriter, Settings};
use scraper::Selector;

/// Registers every built-in filter under its canonical name
pub fn register_all(registry: &mut FilterRegistry) {
    registry.register("container", ContainerFilter);
    registry.register("clean_html", CleanHtmlFilter);
    registry.register("normalize_urls", NormalizeUrlsFilter);
    registry.register("internal_urls", InternalUrlsFilter);
    registry.register("entries", EntriesFilter);
    registry.register("title", TitleFilter);
    registry.register("inner_html", InnerHtmlFilter);
    registry.register("clean_text", CleanTextFilter);
    registry.register("attribution", AttributionFilter);
}

/// Streams `html` through a `lol_html` rewriter and returns the rewritten markup
fn rewrite_html(html: &str, settings: Settings<'_, '_>) -> Result<String, FilterError> {
    let mut output = Vec::new();

    let mut rewriter = HtmlRewriter::new(settings, |c: &[u8]| output.extend_from_slice(c));
    rewriter
        .write(html.as_bytes())
        .map_err(|e| FilterError::Rewrite(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| FilterError::Rewrite(e.to_string()))?;

    String::from_utf8(output).map_err(|e| FilterError::Rewrite(format!("invalid UTF-8: {}", e)))
}

fn parse_selector(selector: &str) -> Result<Selector, FilterError> {
    Selector::parse(selector).map_err(|e| FilterError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
