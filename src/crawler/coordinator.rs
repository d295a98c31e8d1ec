//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding the frontier from the resolved initial URLs
//! - Bounded concurrent fetching
//! - Handing responses to the response handler
//! - Deduplicating and enqueuing discovered internal URLs

use crate::config::{CrawlSettings, ScraperConfig, ScraperOptions};
use crate::crawler::fetcher::{StubTransport, Transport, UnimplementedTransport};
use crate::crawler::strategy::{fixed_pass_options, CrawlPass, InternalUrlSet};
use crate::crawler::{CrawlHistory, CrawlStrategy, Pipeline, ResponseHandler};
use crate::events::{CrawlEvent, EventSink, Instrumenter};
use crate::filter::FilterRegistry;
use crate::output::CrawlStats;
use crate::page::PageRecord;
use crate::site::{BaseHooks, ScraperHooks};
use crate::url::UrlResolver;
use crate::version::VersionFetcher;
use crate::Result;
use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinSet;
use url::Url;

/// A documentation scraper bound to one site configuration
///
/// Root URL, initial URLs and merged options are computed once at build time.
/// The filter pipeline is resolved from the registry on first use.
pub struct Scraper {
    config: Arc<ScraperConfig>,
    resolver: Arc<UrlResolver>,
    options: Arc<ScraperOptions>,
    registry: Arc<FilterRegistry>,
    pipeline: OnceLock<Arc<Pipeline>>,
    transport: Arc<dyn Transport>,
    hooks: Arc<dyn ScraperHooks>,
    settings: CrawlSettings,
    instrumenter: Instrumenter,
}

impl Scraper {
    /// Starts building a scraper for `config`
    pub fn builder(config: ScraperConfig) -> ScraperBuilder {
        ScraperBuilder {
            config,
            transport: None,
            hooks: None,
            registry: None,
            settings: CrawlSettings::default(),
            sink: None,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn resolver(&self) -> &UrlResolver {
        &self.resolver
    }

    /// Options after the per-scraper merge
    pub fn options(&self) -> &ScraperOptions {
        &self.options
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    pub fn root_url(&self) -> &Url {
        self.resolver.root_url()
    }

    pub fn initial_urls(&self) -> &[String] {
        self.resolver.initial_urls()
    }

    /// Resolves a scraper-relative path into an absolute URL
    pub fn url_for(&self, path: &str) -> String {
        self.resolver.url_for(path)
    }

    /// The resolved filter pipeline
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Pipeline>)` - Every filter name resolved
    /// * `Err(HarvestError::Config)` - A stack names an unregistered filter
    pub fn pipeline(&self) -> Result<Arc<Pipeline>> {
        if let Some(pipeline) = self.pipeline.get() {
            return Ok(Arc::clone(pipeline));
        }

        let pipeline = Arc::new(Pipeline::build(
            &self.registry,
            self.config.html_filters(),
            self.config.text_filters(),
        )?);
        let _ = self.pipeline.set(Arc::clone(&pipeline));
        Ok(pipeline)
    }

    /// Crawls the site, calling `on_page` with every processed page
    ///
    /// Pages are delivered in fetch-completion order. The crawl ends when no
    /// fetch is in flight and no newly discovered URL is pending, or with the
    /// first error that is not rescued.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - Counters of the (final) crawl pass
    /// * `Err(HarvestError)` - The crawl was aborted
    pub async fn build_pages<F>(&self, mut on_page: F) -> Result<CrawlStats>
    where
        F: FnMut(PageRecord),
    {
        match self.settings.strategy {
            CrawlStrategy::Standard => self.crawl(self.standard_pass(), &mut on_page).await,
            CrawlStrategy::FixedInternalUrls => {
                self.instrumenter.emit(CrawlEvent::Info {
                    message: "Building internal urls...".to_string(),
                });
                let subpaths = self.fetch_internal_urls().await?;

                self.instrumenter.emit(CrawlEvent::Info {
                    message: "Continuing...".to_string(),
                });
                let pass = self.fixed_pass(&subpaths);
                self.crawl(pass, &mut on_page).await
            }
        }
    }

    /// Crawls the site and returns the subpaths of every page with entries
    pub async fn fetch_internal_urls(&self) -> Result<Vec<String>> {
        let mut internal_urls = InternalUrlSet::default();
        let stats = self
            .crawl(self.standard_pass(), &mut |page: PageRecord| {
                if page.has_entries() {
                    internal_urls.insert(page.subpath);
                }
            })
            .await?;

        let subpaths = internal_urls.into_subpaths();
        tracing::info!(
            "Found {} internal urls with entries out of {} pages",
            subpaths.len(),
            stats.pages_processed
        );
        Ok(subpaths)
    }

    /// Fetches and handles a single page
    pub async fn build_page(&self, path: &str) -> Result<Option<PageRecord>> {
        let url = self.resolver.url_for(path);
        let handler = self.handler(Arc::clone(&self.options))?;

        match self.transport.fetch(&url).await {
            Ok(response) => handler.handle(&response),
            Err(err) => handler.rescue(&url, err),
        }
    }

    /// Compares the documented release against the latest upstream version
    ///
    /// # Returns
    ///
    /// * `Ok(Some(bool))` - Whether the scraper is outdated
    /// * `Ok(None)` - No release is configured or the lookup yielded nothing
    /// * `Err(HarvestError::Unimplemented)` - The site has no version lookup
    pub async fn check_outdated(&self, fetcher: &VersionFetcher) -> Result<Option<bool>> {
        let latest = self.hooks.latest_version(fetcher).await?;

        let (Some(installed), Some(latest)) = (self.config.release(), latest) else {
            return Ok(None);
        };

        let outdated = self.hooks.is_outdated(installed, &latest);
        tracing::info!(
            "{}: installed {}, latest {}{}",
            self.config.name(),
            installed,
            latest,
            if outdated { " (outdated)" } else { "" }
        );
        Ok(Some(outdated))
    }

    fn standard_pass(&self) -> CrawlPass {
        CrawlPass {
            initial_urls: self.resolver.initial_urls().to_vec(),
            options: Arc::clone(&self.options),
        }
    }

    fn fixed_pass(&self, subpaths: &[String]) -> CrawlPass {
        CrawlPass {
            initial_urls: subpaths
                .iter()
                .map(|subpath| self.resolver.url_for(subpath))
                .collect(),
            options: Arc::new(fixed_pass_options(&self.options, subpaths)),
        }
    }

    fn handler(&self, options: Arc<ScraperOptions>) -> Result<ResponseHandler> {
        let handler = ResponseHandler::new(
            Arc::clone(&self.hooks),
            self.pipeline()?,
            options,
            Arc::clone(&self.resolver),
            self.instrumenter.clone(),
            self.settings.rescue_errors,
        );

        Ok(match self.settings.strategy {
            CrawlStrategy::FixedInternalUrls => handler.stamping_response_url(),
            CrawlStrategy::Standard => handler,
        })
    }

    /// Runs one breadth-first crawl pass
    ///
    /// Only this loop touches the crawl history; fetch workers return their
    /// page records and the loop decides what gets enqueued.
    async fn crawl<F>(&self, pass: CrawlPass, on_page: &mut F) -> Result<CrawlStats>
    where
        F: FnMut(PageRecord),
    {
        let handler = self.handler(pass.options)?;
        let limit = self.settings.max_concurrent_requests.max(1);
        let mut stats = CrawlStats::start();

        let mut history = CrawlHistory::default();
        let mut pending: VecDeque<String> = pass
            .initial_urls
            .into_iter()
            .filter(|url| history.add(url))
            .collect();

        self.instrumenter.emit(CrawlEvent::Running {
            urls: pending.iter().cloned().collect(),
        });
        tracing::info!(
            "Starting crawl of {} from {} urls",
            self.config.name(),
            pending.len()
        );

        let mut in_flight = JoinSet::new();

        loop {
            while in_flight.len() < limit {
                let Some(url) = pending.pop_front() else {
                    break;
                };

                let transport = Arc::clone(&self.transport);
                let handler = handler.clone();
                stats.urls_requested += 1;

                in_flight.spawn(async move {
                    match transport.fetch(&url).await {
                        Ok(response) => handler.handle(&response),
                        Err(err) => handler.rescue(&url, err),
                    }
                });
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let Some(page) = joined?? else {
                stats.pages_skipped += 1;
                continue;
            };
            stats.pages_processed += 1;

            let next_urls: Vec<String> = page
                .internal_urls
                .iter()
                .filter(|url| history.add(url))
                .cloned()
                .collect();

            on_page(page);

            if !next_urls.is_empty() {
                self.instrumenter.emit(CrawlEvent::Queued {
                    urls: next_urls.clone(),
                });
                pending.extend(next_urls);
            }

            if stats.pages_processed % 100 == 0 {
                tracing::info!(
                    "Progress: {} pages processed, {} pending, {} in flight",
                    stats.pages_processed,
                    pending.len(),
                    in_flight.len()
                );
            }
        }

        stats.finish();
        tracing::info!(
            "Crawl of {} completed: {} pages processed, {} skipped, {} urls requested",
            self.config.name(),
            stats.pages_processed,
            stats.pages_skipped,
            stats.urls_requested
        );

        Ok(stats)
    }
}

/// Builder returned by [`Scraper::builder`]
pub struct ScraperBuilder {
    config: ScraperConfig,
    transport: Option<Arc<dyn Transport>>,
    hooks: Option<Arc<dyn ScraperHooks>>,
    registry: Option<FilterRegistry>,
    settings: CrawlSettings,
    sink: Option<Arc<dyn EventSink>>,
}

impl ScraperBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ScraperHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Replaces the built-in filter registry
    pub fn registry(mut self, registry: FilterRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn settings(mut self, settings: CrawlSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Resolves URLs, merges options and wires the collaborators together
    ///
    /// A scraper built without a transport or hooks fails with
    /// `HarvestError::Unimplemented` as soon as it needs them.
    pub fn build(self) -> Result<Scraper> {
        let config = self.config;
        let resolver = UrlResolver::new(
            config.base_url(),
            config.root_path(),
            config.initial_paths(),
        )?;
        let options = merge_options(&config, &resolver);

        let mut transport: Arc<dyn Transport> = self
            .transport
            .unwrap_or_else(|| Arc::new(UnimplementedTransport));
        if !config.stubs().is_empty() {
            let mut stubbed = StubTransport::new(transport);
            for (path, body) in config.stubs() {
                stubbed.stub(resolver.url_for(path), Arc::clone(body));
            }
            transport = Arc::new(stubbed);
        }

        Ok(Scraper {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            options: Arc::new(options),
            registry: Arc::new(self.registry.unwrap_or_else(FilterRegistry::with_builtin)),
            pipeline: OnceLock::new(),
            transport,
            hooks: self.hooks.unwrap_or_else(|| Arc::new(BaseHooks)),
            settings: self.settings,
            instrumenter: Instrumenter::new(self.sink),
        })
    }
}

/// Merges the configured options with the scraper's URL layout
///
/// With a root path, `""` and `"/"` are skipped so the bare base URL is not
/// crawled as a second landing page. An allow list always admits the initial
/// paths and the landing page.
fn merge_options(config: &ScraperConfig, resolver: &UrlResolver) -> ScraperOptions {
    let mut options = config.options().clone();
    options.root_path = config.root_path().map(str::to_string);
    options.initial_paths = config.initial_paths().to_vec();
    options.release = config.release().map(str::to_string);

    let root_candidates = || vec![String::new(), "/".to_string()];

    if resolver.has_root_path() {
        options
            .skip
            .get_or_insert_with(Vec::new)
            .extend(root_candidates());
    }

    if options.only.is_some() || options.only_patterns.is_some() {
        let only = options.only.get_or_insert_with(Vec::new);
        only.extend(config.initial_paths().iter().cloned());
        match resolver.root_path().filter(|_| resolver.has_root_path()) {
            Some(root_path) => only.push(root_path.to_string()),
            None => only.extend(root_candidates()),
        }
    }

    options
}
