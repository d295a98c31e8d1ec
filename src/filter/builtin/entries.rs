use super::parse_selector;
use crate::config::TitleOption;
use crate::filter::{Document, Filter, FilterError, PageContext};
use crate::page::PageRecord;
use scraper::ElementRef;

/// Context key under which the page name is handed to later filters
pub const NAME_KEY: &str = "name";

/// Extracts index entries from headings
///
/// The first `h1` names the page and becomes its default entry (except on the
/// root page); every `h2` or `h3` carrying an id adds an anchored entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntriesFilter;

impl Filter for EntriesFilter {
    fn apply(
        &self,
        doc: &mut Document,
        context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        let fragment = doc.fragment();

        let h1 = parse_selector("h1")?;
        let name = fragment
            .select(&h1)
            .next()
            .map(text_of)
            .filter(|name| !name.is_empty());

        if let Some(name) = &name {
            context.set_value(NAME_KEY, name.clone());
            if !context.root_page {
                output.add_entry(name.clone(), None);
            }
        }

        let headings = parse_selector("h2[id], h3[id]")?;
        for heading in fragment.select(&headings) {
            let label = text_of(heading);
            if label.is_empty() {
                continue;
            }
            let anchor = heading.value().id().map(str::to_string);
            output.add_entry(label, anchor);
        }

        Ok(())
    }
}

/// Whitespace-collapsed text content of an element
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prepends an `<h1>` with the page title
///
/// The root page uses `root_title`. Other pages use a fixed `title` option if
/// one is set, then the name found by the entries filter, then the document
/// `<title>`. `title = false` disables the heading on non-root pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleFilter;

impl TitleFilter {
    fn title_for(context: &PageContext) -> Option<String> {
        if context.root_page {
            return context.options.root_title.clone();
        }

        match &context.options.title {
            Some(TitleOption::Toggle(false)) => None,
            Some(TitleOption::Fixed(title)) => Some(title.clone()),
            _ => context
                .value(NAME_KEY)
                .map(str::to_string)
                .or_else(|| context.html_title.clone()),
        }
    }
}

impl Filter for TitleFilter {
    fn apply(
        &self,
        doc: &mut Document,
        context: &mut PageContext,
        output: &mut PageRecord,
    ) -> Result<(), FilterError> {
        let Some(title) = Self::title_for(context) else {
            return Ok(());
        };

        let html = format!("<h1>{}</h1>{}", html_escape::encode_text(&title), doc.html());
        doc.set_html(html);
        output.title = Some(title);
        Ok(())
    }
}
