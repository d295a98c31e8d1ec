use crate::url::{matches_any_pattern, matches_path_list, normalize_subpath};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding, per page subpath, whether that page's links are skipped
pub type LinkPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Per-site options consumed by filters
///
/// The deserializable part comes from the `[options]` table of a scraper file.
/// The remaining fields are filled in when a [`crate::Scraper`] merges its
/// options; after that merge the options are frozen behind an `Arc`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScraperOptions {
    /// CSS selector of the element holding the documentation content
    pub container: Option<String>,

    /// Title policy for non-root pages
    pub title: Option<TitleOption>,

    /// Title prepended to the root page
    pub root_title: Option<String>,

    /// Subpaths never followed
    pub skip: Option<Vec<String>>,

    /// Subpath patterns never followed
    #[serde(deserialize_with = "deserialize_patterns")]
    pub skip_patterns: Option<Vec<Regex>>,

    /// Subpaths allowed to be followed (everything else is ignored)
    pub only: Option<Vec<String>>,

    /// Subpath patterns allowed to be followed
    #[serde(deserialize_with = "deserialize_patterns")]
    pub only_patterns: Option<Vec<Regex>>,

    /// Whether links discovered on a page are followed at all
    pub skip_links: Option<SkipLinks>,

    /// Attribution HTML appended to every page
    pub attribution: Option<String>,

    /// Free-form options for site-specific filters
    pub extra: BTreeMap<String, String>,

    #[serde(skip)]
    pub root_path: Option<String>,

    #[serde(skip)]
    pub initial_paths: Vec<String>,

    #[serde(skip)]
    pub release: Option<String>,

    /// Set while crawling a frozen internal URL set
    #[serde(skip)]
    pub fixed_internal_urls: bool,
}

impl ScraperOptions {
    /// Returns true if links found on the page at `subpath` must not be followed
    pub fn skips_links(&self, subpath: &str) -> bool {
        match &self.skip_links {
            Some(SkipLinks::All(skip)) => *skip,
            Some(SkipLinks::Predicate(predicate)) => predicate(subpath),
            None => false,
        }
    }

    /// Returns true if `subpath` is excluded by `skip` or `skip_patterns`
    pub fn is_skipped(&self, subpath: &str) -> bool {
        self.skip
            .as_deref()
            .map_or(false, |skip| matches_path_list(skip, subpath))
            || self
                .skip_patterns
                .as_deref()
                .map_or(false, |patterns| matches_any_pattern(patterns, subpath))
    }

    /// Returns true if `subpath` passes the `only` / `only_patterns` allow list
    ///
    /// When neither allow list is configured every subpath is allowed.
    pub fn is_allowed(&self, subpath: &str) -> bool {
        if self.only.is_none() && self.only_patterns.is_none() {
            return true;
        }

        self.only
            .as_deref()
            .map_or(false, |only| matches_path_list(only, subpath))
            || self
                .only_patterns
                .as_deref()
                .map_or(false, |patterns| matches_any_pattern(patterns, subpath))
    }

    /// Returns true if a link to `subpath` may be followed
    pub fn admits(&self, subpath: &str) -> bool {
        self.is_allowed(subpath) && !self.is_skipped(subpath)
    }

    /// Returns true if `subpath` designates the landing page
    pub fn is_root_subpath(&self, subpath: &str) -> bool {
        let subpath = normalize_subpath(subpath);
        subpath.is_empty()
            || self
                .root_path
                .as_deref()
                .map_or(false, |root| normalize_subpath(root) == subpath)
    }
}

/// Title policy: `false` disables titles, a string fixes one
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TitleOption {
    Toggle(bool),
    Fixed(String),
}

/// Link-following policy for a page
#[derive(Clone)]
pub enum SkipLinks {
    /// Skip (true) or follow (false) links on every page
    All(bool),
    /// Skip links on pages whose subpath satisfies the predicate
    Predicate(LinkPredicate),
}

impl SkipLinks {
    /// Builds a predicate-based policy
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }
}

impl fmt::Debug for SkipLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All(skip) => f.debug_tuple("All").field(skip).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for SkipLinks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        bool::deserialize(deserializer).map(SkipLinks::All)
    }
}

/// Compiles a list of regex strings while deserializing
fn deserialize_patterns<'de, D>(deserializer: D) -> Result<Option<Vec<Regex>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<String>>::deserialize(deserializer)?;
    raw.map(|patterns| {
        patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    serde::de::Error::custom(format!("invalid pattern '{}': {}", pattern, e))
                })
            })
            .collect()
    })
    .transpose()
}
