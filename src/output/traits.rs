//! Output handler traits and types
//!
//! This module defines the trait interface for page outputs.

use crate::output::CrawlStats;
use crate::page::PageRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination of the pages a crawl delivers
pub trait PageOutput {
    /// Records one delivered page
    fn write_page(&mut self, page: &PageRecord) -> OutputResult<()>;

    /// Flushes pending writes once the crawl is over
    ///
    /// # Arguments
    ///
    /// * `stats` - Statistics of the finished crawl
    fn finalize(&mut self, stats: &CrawlStats) -> OutputResult<()>;
}

/// Output that keeps pages in memory
#[derive(Debug, Default)]
pub struct MemoryOutput {
    pub pages: Vec<PageRecord>,
    pub finalized: bool,
}

impl PageOutput for MemoryOutput {
    fn write_page(&mut self, page: &PageRecord) -> OutputResult<()> {
        self.pages.push(page.clone());
        Ok(())
    }

    fn finalize(&mut self, _stats: &CrawlStats) -> OutputResult<()> {
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_output() {
        let mut output = MemoryOutput::default();
        output.write_page(&PageRecord::new("a")).unwrap();
        output.write_page(&PageRecord::new("b")).unwrap();
        output.finalize(&CrawlStats::start()).unwrap();

        assert_eq!(output.pages.len(), 2);
        assert!(output.finalized);
    }
}
