use regex::Regex;

/// Normalizes a subpath for comparison against skip/only lists
///
/// Leading slashes are dropped and the result is lowercased, so `""` and `"/"`
/// both denote the base URL itself.
///
/// # Examples
///
/// ```
/// use doc_harvest::url::normalize_subpath;
///
/// assert_eq!(normalize_subpath("/Docs/Intro.html"), "docs/intro.html");
/// assert_eq!(normalize_subpath("/"), "");
/// ```
pub fn normalize_subpath(subpath: &str) -> String {
    subpath.trim_start_matches('/').to_lowercase()
}

/// Checks if a subpath appears in a list of subpaths
///
/// Both sides are normalized with [`normalize_subpath`] before comparing.
///
/// # Examples
///
/// ```
/// use doc_harvest::url::matches_path_list;
///
/// let skip = vec!["Copyright.html".to_string(), "/".to_string()];
/// assert!(matches_path_list(&skip, "copyright.html"));
/// assert!(matches_path_list(&skip, ""));
/// assert!(!matches_path_list(&skip, "commands.html"));
/// ```
pub fn matches_path_list(list: &[String], subpath: &str) -> bool {
    let candidate = normalize_subpath(subpath);
    list.iter()
        .any(|entry| normalize_subpath(entry) == candidate)
}

/// Checks if a subpath matches any of the given patterns
///
/// Patterns are matched unanchored against the subpath as written (leading
/// slash removed, case preserved).
pub fn matches_any_pattern(patterns: &[Regex], subpath: &str) -> bool {
    let candidate = subpath.trim_start_matches('/');
    patterns.iter().any(|pattern| pattern.is_match(candidate))
}
