use crate::config::{ScraperConfig, ScraperConfigBuilder, ScraperOptions};
use crate::crawler::CrawlStrategy;
use crate::version::LatestVersionSource;
use crate::ConfigError;
use serde::Deserialize;

/// A scraper file as written on disk
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperFile {
    pub scraper: ScraperSection,

    #[serde(default)]
    pub options: ScraperOptions,

    #[serde(default)]
    pub filters: FiltersSection,

    #[serde(default)]
    pub crawl: CrawlSettings,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    #[serde(rename = "latest-version")]
    pub latest_version: Option<LatestVersionSource>,
}

impl ScraperFile {
    /// Derives a [`ScraperConfig`] from the base configuration
    ///
    /// Filters listed under `[filters]` are appended after the default stacks,
    /// then every `[[filters.insert]]` entry is placed next to its anchor.
    pub fn into_config(&self) -> Result<ScraperConfig, ConfigError> {
        let section = &self.scraper;
        let mut builder = ScraperConfig::base()
            .derive()
            .name(section.name.clone())
            .slug(section.slug.clone())
            .base_url(section.base_url.clone())
            .initial_paths(section.initial_paths.iter().cloned())
            .options(self.options.clone());

        if let Some(release) = &section.release {
            builder = builder.release(release.clone());
        }
        if let Some(root_path) = &section.root_path {
            builder = builder.root_path(root_path.clone());
        }

        builder
            .html_filters_mut()
            .push(self.filters.html.iter().cloned())
            .map_err(|e| ConfigError::Validation(format!("[filters] html: {}", e)))?;
        builder
            .text_filters_mut()
            .push(self.filters.text.iter().cloned())
            .map_err(|e| ConfigError::Validation(format!("[filters] text: {}", e)))?;

        for insertion in &self.filters.insert {
            insertion.apply(&mut builder)?;
        }

        Ok(builder.build())
    }
}

/// Site identity and URL layout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScraperSection {
    /// Display name of the documentation
    pub name: String,

    /// Short identifier, also used in output file names
    pub slug: String,

    /// Documented release
    pub release: Option<String>,

    /// Every crawled page lives under this URL
    pub base_url: String,

    /// Landing page, relative to the base URL
    pub root_path: Option<String>,

    #[serde(default)]
    pub initial_paths: Vec<String>,
}

/// Extra filters added to the default stacks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FiltersSection {
    /// Appended to the HTML stack
    pub html: Vec<String>,
    /// Appended to the text stack
    pub text: Vec<String>,
    pub insert: Vec<FilterInsertion>,
}

/// Stack a `[[filters.insert]]` entry targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPhase {
    Html,
    Text,
}

/// Filters placed immediately before or after an existing filter
///
/// Exactly one of `before` and `after` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterInsertion {
    pub phase: FilterPhase,
    pub before: Option<String>,
    pub after: Option<String>,
    pub names: Vec<String>,
}

impl FilterInsertion {
    fn apply(&self, builder: &mut ScraperConfigBuilder) -> Result<(), ConfigError> {
        let (stack, label) = match self.phase {
            FilterPhase::Html => (builder.html_filters_mut(), "html"),
            FilterPhase::Text => (builder.text_filters_mut(), "text"),
        };
        let names = self.names.iter().cloned();

        let result = match (&self.before, &self.after) {
            (Some(anchor), None) => stack.insert_before(anchor, names),
            (None, Some(anchor)) => stack.insert_after(anchor, names),
            _ => {
                return Err(ConfigError::Validation(format!(
                    "[[filters.insert]] {}: set exactly one of before/after",
                    label
                )))
            }
        };
        result.map_err(|e| ConfigError::Validation(format!("[[filters.insert]] {}: {}", label, e)))
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlSettings {
    /// Maximum number of requests in flight
    pub max_concurrent_requests: usize,

    /// Whether a page failure is logged and skipped instead of aborting the crawl
    pub rescue_errors: bool,

    pub strategy: CrawlStrategy,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 20,
            rescue_errors: true,
            strategy: CrawlStrategy::Standard,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,

    /// Total request timeout in seconds
    pub timeout_secs: u64,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header: `Name/Version (+url; email)`
    ///
    /// Empty contact fields are left out, and so are the parentheses when
    /// both are empty.
    pub fn user_agent(&self) -> String {
        let mut contact = Vec::new();
        if !self.contact_url.is_empty() {
            contact.push(format!("+{}", self.contact_url));
        }
        if !self.contact_email.is_empty() {
            contact.push(self.contact_email.clone());
        }

        if contact.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} ({})",
                self.crawler_name,
                self.crawler_version,
                contact.join("; ")
            )
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "doc-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: String::new(),
            contact_email: String::new(),
            timeout_secs: 30,
        }
    }
}
