//! HTTP transport
//!
//! This module provides the fetch side of the crawler:
//! - The `Transport` trait the crawl loop drives concurrently
//! - A reqwest-backed transport with a descriptive user agent
//! - A stub transport answering configured paths with synthetic pages

use crate::config::{StubBody, UserAgentConfig};
use crate::url::history_key;
use crate::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A fetched response
#[derive(Debug, Clone)]
pub struct Response {
    /// URL that was requested
    pub url: String,
    /// URL after redirects
    pub final_url: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    /// Creates a response whose final URL is the requested URL
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// A 200 `text/html` response
    pub fn html(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(url, 200, body).with_header(CONTENT_TYPE, "text/html; charset=utf-8")
    }

    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        self.content_type()
            .map_or(false, |content_type| content_type.contains("text/html"))
    }
}

/// Fetches one URL
///
/// Implementations must be callable concurrently; the crawler bounds how many
/// fetches are in flight.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Response>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use doc_harvest::config::UserAgentConfig;
/// use doc_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &UserAgentConfig) -> Result<Self> {
        let client = build_http_client(config).map_err(|source| HarvestError::Http {
            url: String::new(),
            source,
        })?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Response> {
        let http_error = |source| HarvestError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_error)?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(http_error)?;

        tracing::debug!("Fetched {} ({})", url, status);

        Ok(Response {
            url: url.to_string(),
            final_url,
            status,
            headers,
            body,
        })
    }
}

/// Answers stubbed URLs with synthetic pages and forwards everything else
pub struct StubTransport {
    inner: Arc<dyn Transport>,
    stubs: HashMap<String, (String, StubBody)>,
}

impl StubTransport {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            inner,
            stubs: HashMap::new(),
        }
    }

    /// Stubs `url` with a 200 `text/html` response produced by `body`
    pub fn stub(&mut self, url: impl Into<String>, body: StubBody) {
        let url = url.into();
        self.stubs.insert(history_key(&url), (url, body));
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}

impl fmt::Debug for StubTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubTransport")
            .field("stubs", &self.stubs.values().map(|(url, _)| url).collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn fetch(&self, url: &str) -> Result<Response> {
        match self.stubs.get(&history_key(url)) {
            Some((stub_url, body)) => {
                tracing::debug!("Serving stub for {}", url);
                Ok(Response::html(stub_url.clone(), body()))
            }
            None => self.inner.fetch(url).await,
        }
    }
}

/// Transport of a scraper that was never given one
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedTransport;

#[async_trait]
impl Transport for UnimplementedTransport {
    async fn fetch(&self, _url: &str) -> Result<Response> {
        Err(HarvestError::Unimplemented("fetch"))
    }
}
