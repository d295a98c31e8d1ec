//! Crawl statistics
//!
//! Counters kept by the crawl loop, with start and finish timestamps.

use chrono::{DateTime, Utc};

/// Statistics of one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// URLs handed to the transport
    pub urls_requested: u64,

    /// Pages delivered to the caller
    pub pages_processed: u64,

    /// Responses ignored or failed and rescued
    pub pages_skipped: u64,
}

impl CrawlStats {
    /// Starts counting now
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            urls_requested: 0,
            pages_processed: 0,
            pages_skipped: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Seconds between start and finish, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let handled = self.pages_processed + self.pages_skipped;
        if handled == 0 {
            return 0.0;
        }
        (self.pages_processed as f64 / handled as f64) * 100.0
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        eprintln!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        eprintln!("  Duration: {}s", seconds);
    }
    eprintln!();

    eprintln!("  URLs requested: {}", stats.urls_requested);
    eprintln!("  Pages processed: {}", stats.pages_processed);
    eprintln!("  Pages skipped: {}", stats.pages_skipped);
    eprintln!();

    eprintln!(
        "Success Rate: {:.1}% ({} / {} responses processed)",
        stats.success_rate(),
        stats.pages_processed,
        stats.pages_processed + stats.pages_skipped
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = CrawlStats::start();
        stats.pages_processed = 80;
        stats.pages_skipped = 20;

        let rate = stats.success_rate();
        assert!((rate - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_zero_pages() {
        assert_eq!(CrawlStats::start().success_rate(), 0.0);
    }

    #[test]
    fn test_finish_sets_duration() {
        let mut stats = CrawlStats::start();
        assert!(stats.duration_seconds().is_none());
        stats.finish();
        assert!(stats.duration_seconds().unwrap() >= 0);
    }
}
