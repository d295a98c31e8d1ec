//! Output module for delivered pages and crawl statistics
//!
//! This module handles:
//! - Writing page records as JSON lines
//! - Recording crawl statistics

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesWriter;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{MemoryOutput, OutputError, OutputResult, PageOutput};
