//! Immutable scraper configuration and its derivation builder

use crate::config::ScraperOptions;
use crate::filter::FilterStack;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Produces the body of a stubbed response
pub type StubBody = Arc<dyn Fn() -> String + Send + Sync>;

/// HTML-phase filters every scraper starts from
pub const DEFAULT_HTML_FILTERS: &[&str] = &["container", "clean_html", "normalize_urls", "internal_urls"];

/// Text-phase filters every scraper starts from
pub const DEFAULT_TEXT_FILTERS: &[&str] = &["inner_html", "clean_text", "attribution"];

/// Configuration of one documentation scraper
///
/// A configuration never changes once built. Site-specific configurations are
/// produced with [`ScraperConfig::derive`], which hands out deep copies of every
/// mutable field, so extending a child never reaches back into its parent.
#[derive(Clone)]
pub struct ScraperConfig {
    name: String,
    slug: String,
    release: Option<String>,
    base_url: String,
    root_path: Option<String>,
    initial_paths: Vec<String>,
    options: ScraperOptions,
    html_filters: FilterStack,
    text_filters: FilterStack,
    stubs: BTreeMap<String, StubBody>,
}

impl ScraperConfig {
    /// The base configuration: no site, default filter stacks
    pub fn base() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            release: None,
            base_url: String::new(),
            root_path: None,
            initial_paths: Vec::new(),
            options: ScraperOptions::default(),
            html_filters: FilterStack::from_names(DEFAULT_HTML_FILTERS.iter().copied()),
            text_filters: FilterStack::from_names(DEFAULT_TEXT_FILTERS.iter().copied()),
            stubs: BTreeMap::new(),
        }
    }

    /// Starts a new configuration derived from this one
    ///
    /// Every field not overridden on the builder is a copy of this
    /// configuration's value at the moment of the call.
    pub fn derive(&self) -> ScraperConfigBuilder {
        ScraperConfigBuilder {
            config: ScraperConfig {
                name: self.name.clone(),
                slug: self.slug.clone(),
                release: self.release.clone(),
                base_url: self.base_url.clone(),
                root_path: self.root_path.clone(),
                initial_paths: self.initial_paths.clone(),
                options: self.options.clone(),
                html_filters: self.html_filters.inheritable_copy(),
                text_filters: self.text_filters.inheritable_copy(),
                stubs: self.stubs.clone(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The documented release, also used as the installed version for staleness checks
    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn root_path(&self) -> Option<&str> {
        self.root_path.as_deref()
    }

    pub fn initial_paths(&self) -> &[String] {
        &self.initial_paths
    }

    pub fn options(&self) -> &ScraperOptions {
        &self.options
    }

    pub fn html_filters(&self) -> &FilterStack {
        &self.html_filters
    }

    pub fn text_filters(&self) -> &FilterStack {
        &self.text_filters
    }

    /// Stubbed response bodies keyed by scraper-relative path
    pub fn stubs(&self) -> &BTreeMap<String, StubBody> {
        &self.stubs
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Debug for ScraperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScraperConfig")
            .field("name", &self.name)
            .field("slug", &self.slug)
            .field("release", &self.release)
            .field("base_url", &self.base_url)
            .field("root_path", &self.root_path)
            .field("initial_paths", &self.initial_paths)
            .field("options", &self.options)
            .field("html_filters", &self.html_filters)
            .field("text_filters", &self.text_filters)
            .field("stubs", &self.stubs.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder returned by [`ScraperConfig::derive`]
///
/// Owns independent copies of the parent's fields; nothing done here is
/// visible to the parent or to sibling derivations.
pub struct ScraperConfigBuilder {
    config: ScraperConfig,
}

impl ScraperConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.config.slug = slug.into();
        self
    }

    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.config.release = Some(release.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn root_path(mut self, root_path: impl Into<String>) -> Self {
        self.config.root_path = Some(root_path.into());
        self
    }

    /// Replaces the initial paths
    pub fn initial_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.initial_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the whole options table
    pub fn options(mut self, options: ScraperOptions) -> Self {
        self.config.options = options;
        self
    }

    /// Edits the inherited options in place
    pub fn configure_options<F>(mut self, edit: F) -> Self
    where
        F: FnOnce(&mut ScraperOptions),
    {
        edit(&mut self.config.options);
        self
    }

    /// Registers a stubbed response body for `path`
    pub fn stub<F>(mut self, path: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.config.stubs.insert(path.into(), Arc::new(body));
        self
    }

    pub fn html_filters_mut(&mut self) -> &mut FilterStack {
        &mut self.config.html_filters
    }

    pub fn text_filters_mut(&mut self) -> &mut FilterStack {
        &mut self.config.text_filters
    }

    pub fn options_mut(&mut self) -> &mut ScraperOptions {
        &mut self.config.options
    }

    /// Freezes the configuration
    pub fn build(self) -> ScraperConfig {
        self.config
    }
}
