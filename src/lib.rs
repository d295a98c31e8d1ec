//! Doc-Harvest: a documentation site scraping engine
//!
//! This crate crawls a documentation site breadth-first, runs every fetched page
//! through an ordered chain of named filters, and hands back structured page
//! records (cleaned HTML, index entries, discovered internal links).

pub mod config;
pub mod crawler;
pub mod events;
pub mod filter;
pub mod output;
pub mod page;
pub mod site;
pub mod url;
pub mod version;

use thiserror::Error;

/// Main error type for Doc-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Filter stack error: {0}")]
    Stack(#[from] filter::StackError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to process {url}: {source}")]
    Page {
        url: String,
        source: filter::FilterError,
    },

    #[error("{0} is not implemented for this scraper")]
    Unimplemented(&'static str),

    #[error("Fetch worker failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarvestError {
    /// Returns true if this error may be isolated to a single page
    ///
    /// Misconfiguration (missing hooks, unknown filters, broken stacks) is never
    /// rescued: it would fail every page the same way.
    pub fn is_rescuable(&self) -> bool {
        !matches!(
            self,
            Self::Unimplemented(_) | Self::Config(_) | Self::Stack(_) | Self::Task(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(String),

    #[error("No filter registered under the name '{0}'")]
    UnknownFilter(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL cannot be used as a base: {0}")]
    NotABase(String),
}

/// Result type alias for Doc-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{ScraperConfig, ScraperOptions};
pub use crawler::{CrawlStrategy, Response, Scraper, Transport};
pub use filter::{Filter, FilterRegistry, FilterStack};
pub use page::{Entry, PageRecord};
pub use version::is_outdated;
