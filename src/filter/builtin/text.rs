use crate::filter::{Document, Filter, FilterError, PageContext};
use crate::page::PageRecord;

/// Copies the working HTML into the page record
#[derive(Debug, Clone, Copy, Default)]
pub struct InnerHtmlFilter;

impl Filter for InnerHtmlFilter {
    fn apply(
        &self,
        doc: &mut Document,
        _context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        output.html = doc.html().to_string();
        Ok(())
    }
}

/// Collapses runs of blank lines and trims the page HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanTextFilter;

impl Filter for CleanTextFilter {
    fn apply(
        &self,
        _doc: &mut Document,
        _context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        output.html = collapse_blank_lines(&output.html);
        Ok(())
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = false;

    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(if blank { "" } else { line.trim_end() });
        previous_blank = blank;
    }

    lines.join("\n").trim().to_string()
}

/// Appends the attribution block to the page
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributionFilter;

impl Filter for AttributionFilter {
    fn apply(
        &self,
        _doc: &mut Document,
        context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        let Some(attribution) = context.options.attribution.as_deref() else {
            return Ok(());
        };

        let attribution = attribution.trim();
        output.html.push_str(&format!(
            "\n<div class=\"_attribution\">\n  <p class=\"_attribution-p\">\n    {}\n    <br>\n    <a href=\"{}\" class=\"_attribution-link\">{}</a>\n  </p>\n</div>",
            attribution,
            html_escape::encode_double_quoted_attribute(context.url.as_str()),
            html_escape::encode_text(context.url.as_str()),
        ));
        output.attribution = Some(attribution.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperOptions;
    use crate::filter::test_support;

    #[test]
    fn test_inner_html_then_clean_text() {
        let mut doc = Document::new("\n\n<p>One</p>   \n\n\n\n<p>Two</p>\n\n");
        let mut ctx = test_support::context("intro", ScraperOptions::default());
        let mut out = PageRecord::new("intro");

        InnerHtmlFilter.apply(&mut doc, &mut ctx, &mut out).unwrap();
        CleanTextFilter.apply(&mut doc, &mut ctx, &mut out).unwrap();

        assert_eq!(out.html, "<p>One</p>\n\n<p>Two</p>");
    }

    #[test]
    fn test_attribution_appended() {
        let options = ScraperOptions {
            attribution: Some("  &copy; Example contributors  ".to_string()),
            ..Default::default()
        };
        let mut doc = Document::default();
        let mut ctx = test_support::context("intro", options);
        let mut out = PageRecord::new("intro");
        out.html = "<p>Body</p>".to_string();

        AttributionFilter.apply(&mut doc, &mut ctx, &mut out).unwrap();

        assert!(out.html.starts_with("<p>Body</p>\n<div class=\"_attribution\">"));
        assert!(out.html.contains("&copy; Example contributors"));
        assert!(out.html.contains(r#"href="https://example.com/docs/intro""#));
        assert_eq!(out.attribution.as_deref(), Some("&copy; Example contributors"));
    }

    #[test]
    fn test_attribution_link_escapes_query() {
        let options = ScraperOptions {
            attribution: Some("Example".to_string()),
            ..Default::default()
        };
        let mut doc = Document::default();
        let mut ctx = test_support::context("search?q=a&lang=en", options);
        let mut out = PageRecord::new("search?q=a&lang=en");

        AttributionFilter.apply(&mut doc, &mut ctx, &mut out).unwrap();

        assert!(out.html.contains(
            r#"<a href="https://example.com/docs/search?q=a&amp;lang=en" class="_attribution-link">https://example.com/docs/search?q=a&amp;lang=en</a>"#
        ));
    }

    #[test]
    fn test_no_attribution_option() {
        let mut doc = Document::default();
        let mut ctx = test_support::context("intro", ScraperOptions::default());
        let mut out = PageRecord::new("intro");
        AttributionFilter.apply(&mut doc, &mut ctx, &mut out).unwrap();
        assert!(out.html.is_empty());
        assert!(out.attribution.is_none());
    }
}
