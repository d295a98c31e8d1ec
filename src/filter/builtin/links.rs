use super::{parse_selector, rewrite_html};
use crate::filter::{Document, Filter, FilterError, PageContext};
use crate::page::PageRecord;
use crate::url::{resolve_link, strip_fragment, subpath_of};
use lol_html::{element, Settings};
use url::Url;

/// Rewrites relative `href` and `src` attributes into absolute URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeUrlsFilter;

impl Filter for NormalizeUrlsFilter {
    fn apply(
        &self,
        doc: &mut Document,
        context: &mut PageContext,
        _output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        let page_url = &context.url;

        let normalized = rewrite_html(
            doc.html(),
            Settings {
                element_content_handlers: vec![
                    element!("a[href]", move |el| {
                        if let Some(href) = el.get_attribute("href") {
                            if let Some(absolute) = absolutize(&href, page_url) {
                                el.set_attribute("href", &absolute)?;
                            }
                        }
                        Ok(())
                    }),
                    element!("img[src], source[src]", move |el| {
                        if let Some(src) = el.get_attribute("src") {
                            if let Some(absolute) = absolutize(&src, page_url) {
                                el.set_attribute("src", &absolute)?;
                            }
                        }
                        Ok(())
                    }),
                ],
                ..Settings::default()
            },
        )?;

        doc.set_html(normalized);
        Ok(())
    }
}

/// Absolute form of a link, or None when the link must stay as written
fn absolutize(href: &str, page_url: &Url) -> Option<String> {
    resolve_link(href, page_url).map(String::from)
}

/// Collects the links of a page that the crawl may follow
///
/// A link qualifies when it lives under the base URL and its subpath passes
/// the skip and allow lists. Nothing is collected on pages whose links are
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalUrlsFilter;

impl Filter for InternalUrlsFilter {
    fn apply(
        &self,
        doc: &mut Document,
        context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        if context.options.skips_links(&context.subpath) {
            return Ok(());
        }

        let selector = parse_selector("a[href]")?;
        let fragment = doc.fragment();

        for element in fragment.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(link) = resolve_link(href, &context.url).map(strip_fragment) else {
                continue;
            };
            let Some(subpath) = subpath_of(&context.base_url, &link) else {
                continue;
            };

            if context.options.admits(&subpath) {
                output.add_internal_url(link.to_string());
            }
        }

        Ok(())
    }
}
