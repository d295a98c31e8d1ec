//! Per-site policy hooks
//!
//! A scraper defers three decisions to its site: whether a response is worth
//! processing, where the latest upstream version is published, and how two
//! versions compare.

use crate::crawler::Response;
use crate::url::subpath_of;
use crate::version::{is_outdated, LatestVersionSource, VersionFetcher};
use crate::{HarvestError, Result};
use async_trait::async_trait;
use url::Url;

#[async_trait]
pub trait ScraperHooks: Send + Sync {
    /// Decides whether `response` goes through the pipeline
    fn should_process(&self, response: &Response, base_url: &Url) -> Result<bool>;

    /// Looks up the latest upstream version
    async fn latest_version(&self, fetcher: &VersionFetcher) -> Result<Option<String>>;

    /// Returns true if `installed` documentation lags behind `latest`
    ///
    /// Sites whose upstream does not use dotted numeric versions override this.
    fn is_outdated(&self, installed: &str, latest: &str) -> bool {
        is_outdated(installed, latest)
    }
}

/// Hooks of a scraper with no site policy: every hook is unimplemented
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseHooks;

#[async_trait]
impl ScraperHooks for BaseHooks {
    fn should_process(&self, _response: &Response, _base_url: &Url) -> Result<bool> {
        Err(HarvestError::Unimplemented("should_process"))
    }

    async fn latest_version(&self, _fetcher: &VersionFetcher) -> Result<Option<String>> {
        Err(HarvestError::Unimplemented("latest_version"))
    }
}

/// Hooks of an ordinary HTML documentation site
///
/// Processes successful (200) HTML responses whose final URL is still under
/// the base URL.
#[derive(Debug, Clone, Default)]
pub struct HtmlSiteHooks {
    latest: Option<LatestVersionSource>,
}

impl HtmlSiteHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latest_version(mut self, source: LatestVersionSource) -> Self {
        self.latest = Some(source);
        self
    }
}

#[async_trait]
impl ScraperHooks for HtmlSiteHooks {
    fn should_process(&self, response: &Response, base_url: &Url) -> Result<bool> {
        if response.status != 200 || !response.is_html() {
            return Ok(false);
        }

        let final_url = Url::parse(&response.final_url)
            .map_err(|e| crate::UrlError::Parse(format!("{}: {}", response.final_url, e)))?;
        Ok(subpath_of(base_url, &final_url).is_some())
    }

    async fn latest_version(&self, fetcher: &VersionFetcher) -> Result<Option<String>> {
        match &self.latest {
            Some(source) => Ok(fetcher.latest(source).await),
            None => Err(HarvestError::Unimplemented("latest_version")),
        }
    }
}
