//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive whole
//! crawls end-to-end through the HTTP transport.

use doc_harvest::config::{load_config, CrawlSettings, ScraperConfig, UserAgentConfig};
use doc_harvest::crawler::HttpTransport;
use doc_harvest::events::{CrawlEvent, RecordingSink};
use doc_harvest::output::{JsonLinesWriter, PageOutput};
use doc_harvest::site::HtmlSiteHooks;
use doc_harvest::version::{LatestVersionSource, VersionFetcher};
use doc_harvest::{CrawlStrategy, HarvestError, PageRecord, Scraper};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves `body` as an HTML page at `route`, expecting exactly `hits` requests
async fn mount_page(server: &MockServer, route: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .expect(hits)
        .mount(server)
        .await;
}

fn docs_config(server: &MockServer) -> ScraperConfig {
    let mut builder = ScraperConfig::base()
        .derive()
        .name("Mock Docs")
        .slug("mock")
        .base_url(format!("{}/docs/", server.uri()));
    builder.html_filters_mut().push(["entries"]).unwrap();
    builder.build()
}

fn scraper(config: ScraperConfig, settings: CrawlSettings, sink: Option<Arc<RecordingSink>>) -> Scraper {
    let transport = HttpTransport::new(&UserAgentConfig::default()).unwrap();
    let mut builder = Scraper::builder(config)
        .transport(Arc::new(transport))
        .hooks(Arc::new(HtmlSiteHooks::new()))
        .settings(settings);
    if let Some(sink) = sink {
        builder = builder.event_sink(sink);
    }
    builder.build().unwrap()
}

async fn collect(scraper: &Scraper) -> Result<Vec<PageRecord>, HarvestError> {
    let mut pages = Vec::new();
    scraper.build_pages(|page| pages.push(page)).await?;
    pages.sort_by(|a, b| a.subpath.cmp(&b.subpath));
    Ok(pages)
}

#[tokio::test]
async fn test_full_crawl_fetches_each_page_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/docs/",
        r#"<!doctype html><html><head><title>Home</title></head><body>
        <h1>Home</h1>
        <a href="a">A</a> <a href="b">B</a> <a href="A">A again</a>
        <a href="https://elsewhere.example/">Elsewhere</a>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/docs/a",
        r#"<h1>Alpha</h1><h2 id="usage">Usage</h2><a href="b#top">B</a><a href="./">Home</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/docs/b", r#"<h1>Beta</h1><a href="c">C</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/docs/c"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::new());
    let scraper = scraper(docs_config(&server), CrawlSettings::default(), Some(sink.clone()));
    let pages = collect(&scraper).await.unwrap();

    let subpaths: Vec<&str> = pages.iter().map(|page| page.subpath.as_str()).collect();
    assert_eq!(subpaths, ["", "a", "b"]);

    let alpha = &pages[1];
    assert_eq!(alpha.entries.len(), 2);
    assert_eq!(alpha.entries[1].anchor.as_deref(), Some("usage"));
    assert!(alpha.html.contains(&format!(r#"href="{}/docs/b#top""#, server.uri())));

    assert!(sink.events().iter().any(|event| matches!(
        event,
        CrawlEvent::IgnoreResponse { status: 404, .. }
    )));
}

#[tokio::test]
async fn test_redirected_page_uses_final_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/docs/new", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/docs/new", "<h1>New</h1>", 1).await;

    let scraper = scraper(docs_config(&server), CrawlSettings::default(), None);
    let page = scraper.build_page("old").await.unwrap().unwrap();

    assert_eq!(page.subpath, "new");
    assert_eq!(page.entries[0].name, "New");
}

fn container_config(server: &MockServer) -> ScraperConfig {
    docs_config(server)
        .derive()
        .root_path("index.html")
        .initial_paths(["broken", "fine"])
        .configure_options(|options| options.container = Some("main".to_string()))
        .build()
}

#[tokio::test]
async fn test_failed_page_is_rescued() {
    let server = MockServer::start().await;
    mount_page(&server, "/docs/index.html", "<main><h1>Index</h1></main>", 1).await;
    mount_page(&server, "/docs/broken", "<div><h1>No container</h1></div>", 1).await;
    mount_page(&server, "/docs/fine", "<main><h1>Fine</h1></main>", 1).await;

    let sink = Arc::new(RecordingSink::new());
    let scraper = scraper(container_config(&server), CrawlSettings::default(), Some(sink.clone()));
    let pages = collect(&scraper).await.unwrap();

    let subpaths: Vec<&str> = pages.iter().map(|page| page.subpath.as_str()).collect();
    assert_eq!(subpaths, ["fine", "index.html"]);

    let errors: Vec<CrawlEvent> = sink
        .events()
        .into_iter()
        .filter(|event| matches!(event, CrawlEvent::Error { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        CrawlEvent::Error { url, .. } if url.ends_with("/docs/broken")
    ));
}

#[tokio::test]
async fn test_failed_page_aborts_without_rescue() {
    let server = MockServer::start().await;
    mount_page(&server, "/docs/index.html", "<main><h1>Index</h1></main>", 1).await;
    mount_page(&server, "/docs/broken", "<div><h1>No container</h1></div>", 1).await;
    mount_page(&server, "/docs/fine", "<main><h1>Fine</h1></main>", 0).await;

    let settings = CrawlSettings {
        max_concurrent_requests: 1,
        rescue_errors: false,
        ..Default::default()
    };
    let scraper = scraper(container_config(&server), settings, None);
    let result = collect(&scraper).await;

    assert!(matches!(
        result,
        Err(HarvestError::Page { url, .. }) if url.ends_with("/docs/broken")
    ));
}

#[tokio::test]
async fn test_fixed_internal_urls_refetch_only_indexed_pages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/docs/",
        r#"<p>Index</p><a href="a">A</a><a href="b">B</a><a href="c">C</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/docs/a", r#"<h1>Alpha</h1><a href="b">B</a>"#, 2).await;
    mount_page(&server, "/docs/b", "<p>No entries here</p>", 1).await;
    mount_page(&server, "/docs/c", r#"<h3 id="gamma">Gamma</h3>"#, 2).await;

    let settings = CrawlSettings {
        strategy: CrawlStrategy::FixedInternalUrls,
        ..Default::default()
    };
    let scraper = scraper(docs_config(&server), settings, None);
    let pages = collect(&scraper).await.unwrap();

    let subpaths: Vec<&str> = pages.iter().map(|page| page.subpath.as_str()).collect();
    assert_eq!(subpaths, ["a", "c"]);
    assert_eq!(
        pages[0].response_url.as_deref(),
        Some(format!("{}/docs/a", server.uri()).as_str())
    );
    assert!(pages[0].internal_urls.is_empty());
}

#[tokio::test]
async fn test_scraper_file_crawl_writes_json_lines() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/guide/start.html",
        r#"<!doctype html><html><head><title>Start</title></head><body>
        <main><h1>Getting started</h1><a href="next.html">Next</a><a href="skip.html">Skip</a></main>
        <script>tracking()</script>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/guide/next.html", "<main><h1>Next steps</h1></main>", 1).await;
    mount_page(&server, "/guide/skip.html", "<main><h1>Skipped</h1></main>", 0).await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[scraper]
name = "Guide"
slug = "guide"
release = "1.0.0"
base-url = "{}/guide/"
root-path = "start.html"

[options]
container = "main"
skip = ["skip.html"]
attribution = "&copy; Guide authors"

[filters]
html = ["entries"]

[crawl]
max-concurrent-requests = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"
"#,
        server.uri()
    )
    .unwrap();
    file.flush().unwrap();

    let scraper_file = load_config(file.path()).unwrap();
    let scraper = Scraper::builder(scraper_file.into_config().unwrap())
        .transport(Arc::new(HttpTransport::new(&scraper_file.user_agent).unwrap()))
        .hooks(Arc::new(HtmlSiteHooks::new()))
        .settings(scraper_file.crawl.clone())
        .build()
        .unwrap();

    let mut output = JsonLinesWriter::new(Vec::new());
    let stats = scraper
        .build_pages(|page| output.write_page(&page).unwrap())
        .await
        .unwrap();
    output.finalize(&stats).unwrap();

    assert_eq!(stats.pages_processed, 2);
    assert_eq!(output.written(), 2);

    let bytes = output.into_inner();
    let records: Vec<serde_json::Value> = String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let start = records
        .iter()
        .find(|record| record["subpath"] == "start.html")
        .unwrap();
    let html = start["html"].as_str().unwrap();
    assert!(html.contains("Getting started"));
    assert!(!html.contains("tracking()"));
    assert!(html.contains("_attribution"));
    assert_eq!(start["internal_urls"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_check_outdated_against_npm() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moment"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"name": "moment", "dist-tags": {"latest": "2.30.1"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = docs_config(&server).derive().release("2.29.4").build();
    let scraper = Scraper::builder(config)
        .hooks(Arc::new(HtmlSiteHooks::new().with_latest_version(
            LatestVersionSource::Npm {
                package: "moment".to_string(),
            },
        )))
        .build()
        .unwrap();

    let fetcher = VersionFetcher::new(reqwest::Client::new()).with_endpoints(server.uri(), server.uri());
    assert_eq!(scraper.check_outdated(&fetcher).await.unwrap(), Some(true));
}

#[tokio::test]
async fn test_check_outdated_against_page_selector() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/download",
        r#"<html><body><p>Current release: <span class="version"> v3.1.0 </span></p></body></html>"#,
        1,
    )
    .await;

    let config = docs_config(&server).derive().release("3.0.2").build();
    let scraper = Scraper::builder(config)
        .hooks(Arc::new(HtmlSiteHooks::new().with_latest_version(
            LatestVersionSource::Page {
                url: format!("{}/download", server.uri()),
                selector: "span.version".to_string(),
            },
        )))
        .build()
        .unwrap();

    let fetcher = VersionFetcher::new(reqwest::Client::new()).with_endpoints(server.uri(), server.uri());
    assert_eq!(scraper.check_outdated(&fetcher).await.unwrap(), Some(true));
}

#[tokio::test]
async fn test_page_version_without_match_is_none() {
    let server = MockServer::start().await;
    mount_page(&server, "/download", "<p>No version here</p>", 1).await;

    let fetcher = VersionFetcher::new(reqwest::Client::new());
    let url = format!("{}/download", server.uri());
    assert_eq!(fetcher.page_version(&url, ".version").await, None);
}

#[tokio::test]
async fn test_github_file_contents_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/contents/VERSION"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"name": "VERSION", "encoding": "base64", "content": "MS4y\nLjAK\n"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/contents/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"content": "@@@"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = VersionFetcher::new(reqwest::Client::new()).with_endpoints(server.uri(), server.uri());
    assert_eq!(
        fetcher.github_file_contents("acme", "widgets", "VERSION").await.as_deref(),
        Some("1.2.0\n")
    );
    assert_eq!(fetcher.github_file_contents("acme", "widgets", "broken").await, None);
}

#[tokio::test]
async fn test_fetch_doc_parses_html() {
    let server = MockServer::start().await;
    mount_page(&server, "/changelog", "<h2>2.4.0</h2><h2>2.3.1</h2>", 1).await;

    let fetcher = VersionFetcher::new(reqwest::Client::new());
    let doc = fetcher
        .fetch_doc(&format!("{}/changelog", server.uri()))
        .await
        .unwrap();
    let selector = scraper::Selector::parse("h2").unwrap();
    let headings: Vec<String> = doc.select(&selector).map(|h| h.text().collect()).collect();
    assert_eq!(headings, ["2.4.0", "2.3.1"]);
}

#[tokio::test]
async fn test_missing_latest_version_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/releases/latest"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = docs_config(&server).derive().release("1.0.0").build();
    let scraper = Scraper::builder(config)
        .hooks(Arc::new(HtmlSiteHooks::new().with_latest_version(
            LatestVersionSource::GithubRelease {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
            },
        )))
        .build()
        .unwrap();

    let fetcher = VersionFetcher::new(reqwest::Client::new()).with_endpoints(server.uri(), server.uri());
    assert_eq!(scraper.check_outdated(&fetcher).await.unwrap(), None);
}
