use super::{parse_selector, rewrite_html};
use crate::filter::{Document, Filter, FilterError, PageContext};
use crate::page::PageRecord;
use lol_html::{element, Settings};

/// Elements stripped by [`CleanHtmlFilter`]
const NOISE_SELECTOR: &str = "script, style, noscript, iframe";

/// Narrows the document to the content of the `container` option
///
/// Without a `container` option the document is left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerFilter;

impl Filter for ContainerFilter {
    fn apply(
        &self,
        doc: &mut Document,
        context: &mut PageContext,
        _output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        let Some(container) = context.options.container.as_deref() else {
            return Ok(());
        };

        let selector = parse_selector(container)?;
        let inner = doc
            .fragment()
            .select(&selector)
            .next()
            .map(|element| element.inner_html())
            .ok_or_else(|| FilterError::MissingElement {
                selector: container.to_string(),
            })?;

        doc.set_html(inner);
        Ok(())
    }
}

/// Removes scripts, styles and embedded frames
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanHtmlFilter;

impl Filter for CleanHtmlFilter {
    fn apply(
        &self,
        doc: &mut Document,
        _context: &mut PageContext,
        _output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        let cleaned = rewrite_html(
            doc.html(),
            Settings {
                element_content_handlers: vec![element!(NOISE_SELECTOR, |el| {
                    el.remove();
                    Ok(())
                })],
                ..Settings::default()
            },
        )?;

        doc.set_html(cleaned);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperOptions;
    use crate::filter::test_support;

    fn run(filter: &dyn Filter, html: &str, options: ScraperOptions) -> Result<Document, FilterError> {
        let mut doc = Document::new(html);
        let mut ctx = test_support::context("intro", options);
        let mut out = PageRecord::default();
        filter.apply(&mut doc, &mut ctx, &mut out)?;
        Ok(doc)
    }

    #[test]
    fn test_container_narrows_document() {
        let options = ScraperOptions {
            container: Some(".content".to_string()),
            ..Default::default()
        };
        let doc = run(
            &ContainerFilter,
            r#"<nav>menu</nav><div class="content"><p>Body</p></div>"#,
            options,
        )
        .unwrap();
        assert_eq!(doc.html(), "<p>Body</p>");
    }

    #[test]
    fn test_container_missing_element_fails() {
        let options = ScraperOptions {
            container: Some("#main".to_string()),
            ..Default::default()
        };
        let result = run(&ContainerFilter, "<p>Body</p>", options);
        assert!(matches!(
            result,
            Err(FilterError::MissingElement { selector }) if selector == "#main"
        ));
    }

    #[test]
    fn test_container_without_option_is_noop() {
        let doc = run(&ContainerFilter, "<p>Body</p>", ScraperOptions::default()).unwrap();
        assert_eq!(doc.html(), "<p>Body</p>");
    }

    #[test]
    fn test_clean_html_strips_noise() {
        let doc = run(
            &CleanHtmlFilter,
            r#"<p>Keep</p><script>alert(1)</script><style>p{}</style><iframe src="x"></iframe>"#,
            ScraperOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.html(), "<p>Keep</p>");
    }
}
