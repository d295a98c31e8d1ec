//! Configuration module for Doc-Harvest
//!
//! This module holds the programmatic scraper configuration (`ScraperConfig`
//! and its derive builder), the per-site options consumed by filters, and the
//! loading, validation and hashing of TOML scraper files.
//!
//! # Example
//!
//! ```no_run
//! use doc_harvest::config::load_config;
//! use std::path::Path;
//!
//! let file = load_config(Path::new("moment.toml")).unwrap();
//! let config = file.into_config().unwrap();
//! println!("Crawling {} from {}", config.name(), config.base_url());
//! ```

mod options;
mod parser;
mod scraper;
mod types;
mod validation;

pub use options::{LinkPredicate, ScraperOptions, SkipLinks, TitleOption};
pub use scraper::{
    ScraperConfig, ScraperConfigBuilder, StubBody, DEFAULT_HTML_FILTERS, DEFAULT_TEXT_FILTERS,
};
pub use types::{
    CrawlSettings, FilterInsertion, FilterPhase, FiltersSection, ScraperFile, ScraperSection,
    UserAgentConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
