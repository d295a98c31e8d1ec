//! URL handling module for Doc-Harvest
//!
//! This module provides path joining, crawl-history normalization, subpath
//! matching against skip/only rules, and the per-scraper URL resolver.

mod matcher;
mod normalize;
mod resolver;

// Re-export main functions
pub use matcher::{matches_any_pattern, matches_path_list, normalize_subpath};
pub use normalize::{history_key, resolve_link, strip_fragment};
pub use resolver::{subpath_of, UrlResolver};

/// Joins a base URL and a path with exactly one slash at the seam
///
/// Mirrors a filesystem-style join: trailing slashes on the base and leading
/// slashes on the path collapse, while a trailing slash on the path is kept.
///
/// # Examples
///
/// ```
/// use doc_harvest::url::join_url;
///
/// assert_eq!(join_url("https://example.com/", "/docs/"), "https://example.com/docs/");
/// assert_eq!(join_url("https://example.com/api", "index.html"), "https://example.com/api/index.html");
/// ```
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_collapses_slashes() {
        assert_eq!(
            join_url("https://example.com/", "/page"),
            "https://example.com/page"
        );
        assert_eq!(
            join_url("https://example.com", "page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_join_keeps_trailing_slash() {
        assert_eq!(
            join_url("http://momentjs.com/", "/docs/"),
            "http://momentjs.com/docs/"
        );
    }

    #[test]
    fn test_join_empty_path() {
        assert_eq!(join_url("https://example.com/docs", ""), "https://example.com/docs/");
    }
}
