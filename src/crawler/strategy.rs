//! Crawl strategies
//!
//! The standard strategy is one breadth-first crawl from the initial URLs. The
//! fixed-internal-URLs strategy first crawls to find which pages carry index
//! entries, then crawls exactly those pages and nothing else.

use crate::config::ScraperOptions;
use crate::url::history_key;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrawlStrategy {
    #[default]
    Standard,
    FixedInternalUrls,
}

/// Everything one crawl pass needs beyond the scraper itself
#[derive(Debug, Clone)]
pub(crate) struct CrawlPass {
    pub initial_urls: Vec<String>,
    pub options: Arc<ScraperOptions>,
}

/// Subpaths of the pages that yielded entries, in delivery order
#[derive(Debug, Default)]
pub(crate) struct InternalUrlSet {
    subpaths: Vec<String>,
    seen: HashSet<String>,
}

impl InternalUrlSet {
    pub fn insert(&mut self, subpath: String) {
        if self.seen.insert(history_key(&subpath)) {
            self.subpaths.push(subpath);
        }
    }

    pub fn into_subpaths(self) -> Vec<String> {
        self.subpaths
    }
}

/// Options of the second pass: the fixed set is the whole allow list
pub(crate) fn fixed_pass_options(options: &ScraperOptions, subpaths: &[String]) -> ScraperOptions {
    let mut options = options.clone();
    options.only = Some(subpaths.to_vec());
    options.only_patterns = None;
    options.skip = None;
    options.skip_patterns = None;
    options.skip_links = None;
    options.fixed_internal_urls = true;
    options
}
