use url::Url;

/// Returns the key under which a URL is recorded in crawl history
///
/// URLs are compared case-insensitively for the lifetime of a crawl, so two
/// links that differ only in letter case are fetched once.
///
/// # Examples
///
/// ```
/// use doc_harvest::url::history_key;
///
/// assert_eq!(history_key("https://Example.com/Guide"), "https://example.com/guide");
/// ```
pub fn history_key(url: &str) -> String {
    url.to_lowercase()
}

/// Removes the fragment (everything after `#`) from a URL
pub fn strip_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

/// Resolves a link href against the page it appears on
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs (same page anchors)
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use doc_harvest::url::resolve_link;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/docs/intro").unwrap();
/// let link = resolve_link("setup#install", &page).unwrap();
/// assert_eq!(link.as_str(), "https://example.com/docs/setup#install");
/// assert!(resolve_link("mailto:team@example.com", &page).is_none());
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
