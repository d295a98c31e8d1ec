use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

/// Default npm registry endpoint
pub const NPM_REGISTRY: &str = "https://registry.npmjs.com";

/// Default GitHub API endpoint
pub const GITHUB_API: &str = "https://api.github.com";

/// Where the latest upstream version of a documented project is published
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum LatestVersionSource {
    /// `dist-tags.latest` of an npm package
    Npm { package: String },
    /// Tag of the latest GitHub release
    GithubRelease { owner: String, repo: String },
    /// Most recent GitHub tag
    GithubTag { owner: String, repo: String },
    /// Text of the first element matching `selector` on a web page
    Page { url: String, selector: String },
}

/// Looks up upstream versions
///
/// A failed lookup is logged and yields `None`; it never aborts the caller.
#[derive(Debug, Clone)]
pub struct VersionFetcher {
    client: Client,
    github_token: Option<String>,
    npm_registry: String,
    github_api: String,
}

impl VersionFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            github_token: None,
            npm_registry: NPM_REGISTRY.to_string(),
            github_api: GITHUB_API.to_string(),
        }
    }

    /// Sends `Authorization: token …` with GitHub API requests
    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    /// Points the fetcher at other registry and API hosts
    pub fn with_endpoints(mut self, npm_registry: impl Into<String>, github_api: impl Into<String>) -> Self {
        self.npm_registry = npm_registry.into().trim_end_matches('/').to_string();
        self.github_api = github_api.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetches `url` as text
    ///
    /// # Returns
    ///
    /// * `Some(String)` - The body of a successful response
    /// * `None` - The request failed or returned a non-success status
    pub async fn fetch_text(&self, url: &str) -> Option<String> {
        tracing::debug!("Fetching {}", url);

        let mut request = self.client.get(url);
        if let Some(token) = &self.github_token {
            if url.starts_with(&self.github_api) {
                request = request.header(AUTHORIZATION, format!("token {}", token));
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Couldn't fetch {} ({})", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Couldn't fetch {} (response code {})", url, status.as_u16());
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!("Couldn't read {} ({})", url, e);
                None
            }
        }
    }

    /// Fetches `url` and parses it as JSON
    pub async fn fetch_json(&self, url: &str) -> Option<Value> {
        let body = self.fetch_text(url).await?;
        match serde_json::from_str(&body) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!("Invalid JSON from {}: {}", url, e);
                None
            }
        }
    }

    /// Fetches `url` and parses it as an HTML document
    pub async fn fetch_doc(&self, url: &str) -> Option<Html> {
        let body = self.fetch_text(url).await?;
        Some(Html::parse_document(&body))
    }

    pub async fn npm_version(&self, package: &str) -> Option<String> {
        let json = self
            .fetch_json(&format!("{}/{}", self.npm_registry, package))
            .await?;
        json.pointer("/dist-tags/latest")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Tag of the latest release, without a leading `v`
    pub async fn github_latest_release(&self, owner: &str, repo: &str) -> Option<String> {
        let json = self
            .fetch_json(&format!("{}/repos/{}/{}/releases/latest", self.github_api, owner, repo))
            .await?;
        json.get("tag_name")
            .and_then(Value::as_str)
            .map(strip_v_prefix)
    }

    /// Tag names, most recent first
    pub async fn github_tags(&self, owner: &str, repo: &str) -> Option<Vec<String>> {
        let json = self
            .fetch_json(&format!("{}/repos/{}/{}/tags", self.github_api, owner, repo))
            .await?;
        let tags = json
            .as_array()?
            .iter()
            .filter_map(|tag| tag.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        Some(tags)
    }

    /// Decoded contents of `path` in a GitHub repository's default branch
    pub async fn github_file_contents(&self, owner: &str, repo: &str, path: &str) -> Option<String> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.github_api,
            owner,
            repo,
            path.trim_start_matches('/')
        );
        let json = self.fetch_json(&url).await?;
        let Some(content) = json.get("content").and_then(Value::as_str) else {
            tracing::error!("No content in response from {}", url);
            return None;
        };

        // The API wraps the payload every 60 characters
        let encoded: String = content.split_whitespace().collect();
        let bytes = match STANDARD.decode(encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Invalid base64 content from {}: {}", url, e);
                return None;
            }
        };
        match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!("Non UTF-8 content from {}: {}", url, e);
                None
            }
        }
    }

    /// Trimmed text of the first element matching `selector` at `url`
    pub async fn page_version(&self, url: &str, selector: &str) -> Option<String> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::error!("Invalid version selector '{}': {:?}", selector, e);
                return None;
            }
        };

        let doc = self.fetch_doc(url).await?;
        let text = doc
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>())?;
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(strip_v_prefix(text))
        }
    }

    /// Latest version published at `source`
    pub async fn latest(&self, source: &LatestVersionSource) -> Option<String> {
        match source {
            LatestVersionSource::Npm { package } => self.npm_version(package).await,
            LatestVersionSource::GithubRelease { owner, repo } => {
                self.github_latest_release(owner, repo).await
            }
            LatestVersionSource::GithubTag { owner, repo } => self
                .github_tags(owner, repo)
                .await?
                .first()
                .map(|tag| strip_v_prefix(tag)),
            LatestVersionSource::Page { url, selector } => self.page_version(url, selector).await,
        }
    }
}

fn strip_v_prefix(tag: &str) -> String {
    tag.strip_prefix('v').unwrap_or(tag).to_string()
}
