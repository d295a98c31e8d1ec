use crate::config::types::{CrawlSettings, ScraperFile, ScraperSection, UserAgentConfig};
use crate::config::ScraperOptions;
use crate::version::LatestVersionSource;
use crate::ConfigError;
use url::Url;

/// Validates a whole scraper file
pub fn validate(file: &ScraperFile) -> Result<(), ConfigError> {
    validate_scraper_section(&file.scraper)?;
    validate_options(&file.options)?;
    validate_crawl_settings(&file.crawl)?;
    validate_user_agent_config(&file.user_agent)?;
    if let Some(source) = &file.latest_version {
        validate_latest_version(source)?;
    }
    Ok(())
}

fn validate_scraper_section(section: &ScraperSection) -> Result<(), ConfigError> {
    if section.name.trim().is_empty() {
        return Err(ConfigError::Validation("name cannot be empty".to_string()));
    }

    validate_slug(&section.slug)?;

    let url = Url::parse(&section.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", section.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use HTTP or HTTPS",
            section.base_url
        )));
    }

    if url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' cannot carry a fragment",
            section.base_url
        )));
    }

    Ok(())
}

/// Slugs name output files: lowercase letters, digits, `_`, `~`, `.` and `-`
fn validate_slug(slug: &str) -> Result<(), ConfigError> {
    if slug.is_empty() {
        return Err(ConfigError::Validation("slug cannot be empty".to_string()));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '~' | '.' | '-'))
    {
        return Err(ConfigError::Validation(format!(
            "slug must contain only lowercase letters, digits, '_', '~', '.' and '-', got '{}'",
            slug
        )));
    }

    Ok(())
}

fn validate_options(options: &ScraperOptions) -> Result<(), ConfigError> {
    if let Some(container) = &options.container {
        ::scraper::Selector::parse(container).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid container selector '{}': {:?}", container, e))
        })?;
    }
    Ok(())
}

fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.max_concurrent_requests < 1 || settings.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 100, got {}",
            settings.max_concurrent_requests
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if !config.contact_url.is_empty() {
        Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    if !config.contact_email.is_empty() {
        validate_email(&config.contact_email)?;
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_latest_version(source: &LatestVersionSource) -> Result<(), ConfigError> {
    let fields: Vec<(&str, &str)> = match source {
        LatestVersionSource::Npm { package } => vec![("package", package.as_str())],
        LatestVersionSource::GithubRelease { owner, repo }
        | LatestVersionSource::GithubTag { owner, repo } => {
            vec![("owner", owner.as_str()), ("repo", repo.as_str())]
        }
        LatestVersionSource::Page { url, selector } => {
            if !url.trim().is_empty() {
                Url::parse(url).map_err(|e| ConfigError::InvalidUrl(format!("Invalid [latest-version] url '{}': {}", url, e)))?;
            }
            if !selector.trim().is_empty() && scraper::Selector::parse(selector).is_err() {
                return Err(ConfigError::Validation(format!(
                    "[latest-version] invalid selector '{}'",
                    selector
                )));
            }
            vec![("url", url.as_str()), ("selector", selector.as_str())]
        }
    };

    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(ConfigError::Validation(format!(
            "[latest-version] {} cannot be empty",
            field
        ))),
        None => Ok(()),
    }
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
