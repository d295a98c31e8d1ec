//! Response handler: gate, parse, run the pipeline, isolate failures

use crate::config::ScraperOptions;
use crate::crawler::parser::parse_body;
use crate::crawler::{Pipeline, Response};
use crate::events::{CrawlEvent, Instrumenter};
use crate::filter::PageContext;
use crate::page::PageRecord;
use crate::site::ScraperHooks;
use crate::url::{subpath_of, UrlResolver};
use crate::{HarvestError, Result, UrlError};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// Turns responses into page records for one crawl pass
///
/// Cheap to clone; every fetch worker gets its own copy.
#[derive(Clone)]
pub struct ResponseHandler {
    hooks: Arc<dyn ScraperHooks>,
    pipeline: Arc<Pipeline>,
    options: Arc<ScraperOptions>,
    resolver: Arc<UrlResolver>,
    instrumenter: Instrumenter,
    rescue_errors: bool,
    stamp_response_url: bool,
}

impl ResponseHandler {
    pub fn new(
        hooks: Arc<dyn ScraperHooks>,
        pipeline: Arc<Pipeline>,
        options: Arc<ScraperOptions>,
        resolver: Arc<UrlResolver>,
        instrumenter: Instrumenter,
        rescue_errors: bool,
    ) -> Self {
        Self {
            hooks,
            pipeline,
            options,
            resolver,
            instrumenter,
            rescue_errors,
            stamp_response_url: false,
        }
    }

    /// Records the final response URL on every page
    pub fn stamping_response_url(mut self) -> Self {
        self.stamp_response_url = true;
        self
    }

    /// Handles one response
    ///
    /// # Returns
    ///
    /// * `Ok(Some(PageRecord))` - The page was processed
    /// * `Ok(None)` - The page was ignored, or failed while errors are rescued
    /// * `Err(HarvestError)` - The failure must abort the crawl
    pub fn handle(&self, response: &Response) -> Result<Option<PageRecord>> {
        match self.try_handle(response) {
            Ok(page) => Ok(page),
            Err(err) => self.rescue(&response.url, err),
        }
    }

    /// Applies the rescue policy to a failure on `url`
    ///
    /// Rescued failures are reported once and swallowed. Misconfiguration is
    /// never rescued.
    pub fn rescue(&self, url: &str, err: HarvestError) -> Result<Option<PageRecord>> {
        if !self.rescue_errors || !err.is_rescuable() {
            return Err(err);
        }

        if self.instrumenter.is_enabled() {
            self.instrumenter.emit(CrawlEvent::Error {
                url: url.to_string(),
                message: err.to_string(),
            });
        } else {
            tracing::error!("Failed to process {}: {}", url, err);
        }

        Ok(None)
    }

    fn try_handle(&self, response: &Response) -> Result<Option<PageRecord>> {
        if !self
            .hooks
            .should_process(response, self.resolver.base_url())?
        {
            self.ignore(response);
            return Ok(None);
        }

        self.instrumenter.emit(CrawlEvent::ProcessResponse {
            url: response.url.clone(),
        });

        match self.process_response(response) {
            Err(HarvestError::Page { source, .. }) if source.is_ignored() => {
                tracing::debug!("{} ignored by filter: {}", response.url, source);
                self.ignore(response);
                Ok(None)
            }
            result => result.map(Some),
        }
    }

    fn ignore(&self, response: &Response) {
        self.instrumenter.emit(CrawlEvent::IgnoreResponse {
            url: response.url.clone(),
            status: response.status,
        });
    }

    fn process_response(&self, response: &Response) -> Result<PageRecord> {
        let parsed = parse_body(&response.body);

        let url = Url::parse(&response.final_url)
            .map_err(|e| UrlError::Parse(format!("{}: {}", response.final_url, e)))?;
        let subpath = subpath_of(self.resolver.base_url(), &url).unwrap_or_default();

        let mut context = PageContext {
            options: Arc::clone(&self.options),
            base_url: self.resolver.base_url().clone(),
            root_url: self.resolver.root_url().clone(),
            root_page: self.options.is_root_subpath(&subpath),
            subpath: subpath.clone(),
            url,
            html_title: parsed.title,
            values: BTreeMap::new(),
        };

        let mut page = PageRecord::new(subpath);
        self.pipeline
            .run(parsed.html, &mut context, &mut page)
            .map_err(|source| HarvestError::Page {
                url: response.url.clone(),
                source,
            })?;

        if self.stamp_response_url {
            page.response_url = Some(response.final_url.clone());
        }

        Ok(page)
    }
}
