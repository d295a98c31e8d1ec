//! Crawler module for fetching and processing documentation pages
//!
//! This module contains the core crawling logic, including:
//! - The transport seam and its HTTP and stub implementations
//! - Response body parsing
//! - The filter pipeline and the response handler around it
//! - The breadth-first crawl loop and its strategies

mod coordinator;
mod fetcher;
mod handler;
mod history;
mod parser;
mod pipeline;
mod strategy;

pub use coordinator::{Scraper, ScraperBuilder};
pub use fetcher::{
    build_http_client, HttpTransport, Response, StubTransport, Transport, UnimplementedTransport,
};
pub use handler::ResponseHandler;
pub use history::CrawlHistory;
pub use parser::{parse_body, ParsedBody};
pub use pipeline::Pipeline;
pub use strategy::CrawlStrategy;
