use crate::url::history_key;
use std::collections::HashSet;

/// URLs already enqueued or visited during one crawl, compared ignoring case
///
/// Only the crawl loop mutates a history; workers never see it.
#[derive(Debug, Default)]
pub struct CrawlHistory {
    seen: HashSet<String>,
}

impl CrawlHistory {
    /// Records `url`, returning true only the first time it is seen
    pub fn add(&mut self, url: &str) -> bool {
        self.seen.insert(history_key(url))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(&history_key(url))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
