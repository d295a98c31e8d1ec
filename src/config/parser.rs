use crate::config::types::ScraperFile;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a scraper file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML scraper file
///
/// # Returns
///
/// * `Ok(ScraperFile)` - Successfully loaded and validated scraper file
/// * `Err(ConfigError)` - Failed to load, parse, or validate the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use doc_harvest::config::load_config;
///
/// let file = load_config(Path::new("moment.toml")).unwrap();
/// println!("Base URL: {}", file.scraper.base_url);
/// ```
pub fn load_config(path: &Path) -> Result<ScraperFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: ScraperFile = toml::from_str(&content)?;

    validate(&file)?;

    Ok(file)
}

/// Computes a SHA-256 hash of the scraper file content
///
/// Used to tell whether the scraper definition changed between two runs.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a scraper file and returns it together with its hash
pub fn load_config_with_hash(path: &Path) -> Result<(ScraperFile, String), ConfigError> {
    let file = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((file, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TitleOption;
    use crate::crawler::CrawlStrategy;
    use crate::version::LatestVersionSource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[scraper]
name = "TypeScript"
slug = "typescript"
release = "5.1.3"
base-url = "https://www.typescriptlang.org/"
root-path = "docs/handbook/index.html"
initial-paths = ["tsconfig/"]

[options]
container = "main"
title = false
skip = ["play"]
skip-patterns = ["^release-notes/"]
attribution = "&copy; Microsoft"

[crawl]
max-concurrent-requests = 4
rescue-errors = false
strategy = "fixed-internal-urls"

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[latest-version]
source = "github-release"
owner = "microsoft"
repo = "TypeScript"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.scraper.slug, "typescript");
        assert_eq!(config.scraper.initial_paths, ["tsconfig/"]);
        assert_eq!(config.options.container.as_deref(), Some("main"));
        assert_eq!(config.options.title, Some(TitleOption::Toggle(false)));
        assert!(config.options.is_skipped("release-notes/5.0.html"));
        assert_eq!(config.crawl.max_concurrent_requests, 4);
        assert!(!config.crawl.rescue_errors);
        assert_eq!(config.crawl.strategy, CrawlStrategy::FixedInternalUrls);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(
            config.latest_version,
            Some(LatestVersionSource::GithubRelease {
                owner: "microsoft".to_string(),
                repo: "TypeScript".to_string(),
            })
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = create_temp_config(
            r#"
[scraper]
name = "Example"
slug = "example"
base-url = "https://example.com/docs/"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.max_concurrent_requests, 20);
        assert!(config.crawl.rescue_errors);
        assert_eq!(config.user_agent.crawler_name, "doc-harvest");
        assert!(config.options.skip.is_none());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_invalid_pattern() {
        let file = create_temp_config(
            r#"
[scraper]
name = "Example"
slug = "example"
base-url = "https://example.com/"

[options]
only-patterns = ["(unclosed"]
"#,
        );
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config(
            r#"
[scraper]
name = "Example"
slug = "example"
base-url = "https://example.com/"

[crawl]
max-concurrent-requests = 0
"#,
        );
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
