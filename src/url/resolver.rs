use crate::url::join_url;
use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves scraper-relative paths into absolute URLs
///
/// The root URL and the initial URL frontier are computed once, when the
/// resolver is built, and are never recomputed afterwards.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    base_url: Url,
    root_path: Option<String>,
    root_url: Url,
    initial_urls: Vec<String>,
}

impl UrlResolver {
    /// Creates a resolver for a scraper's base URL, root path and initial paths
    ///
    /// # Arguments
    ///
    /// * `base_url` - Absolute HTTP(S) URL every page of the site lives under
    /// * `root_path` - Optional path of the landing page, relative to `base_url`
    /// * `initial_paths` - Extra paths seeded into the first crawl round
    ///
    /// # Returns
    ///
    /// * `Ok(UrlResolver)` - Resolver with root and initial URLs precomputed
    /// * `Err(UrlError)` - The base URL (or the joined root URL) is not usable
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_harvest::url::UrlResolver;
    ///
    /// let resolver = UrlResolver::new("http://momentjs.com", Some("/docs/"), &["/guides/".to_string()]).unwrap();
    /// assert_eq!(resolver.root_url().as_str(), "http://momentjs.com/docs/");
    /// assert_eq!(resolver.initial_urls(), ["http://momentjs.com/docs/", "http://momentjs.com/guides/"]);
    /// ```
    pub fn new(base_url: &str, root_path: Option<&str>, initial_paths: &[String]) -> UrlResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| UrlError::Parse(format!("{}: {}", base_url, e)))?;

        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS base URLs are supported, got: {}",
                base_url.scheme()
            )));
        }

        if base_url.cannot_be_a_base() {
            return Err(UrlError::NotABase(base_url.to_string()));
        }

        let root_path = root_path.map(str::to_string);
        let root_url = match root_path.as_deref() {
            Some(path) if is_root_path(path) => {
                let joined = join_url(base_url.as_str(), path);
                Url::parse(&joined).map_err(|e| UrlError::Parse(format!("{}: {}", joined, e)))?
            }
            _ => base_url.clone(),
        };

        let mut resolver = Self {
            base_url,
            root_path,
            root_url,
            initial_urls: Vec::new(),
        };

        let mut initial_urls = Vec::with_capacity(initial_paths.len() + 1);
        initial_urls.push(resolver.root_url.to_string());
        initial_urls.extend(initial_paths.iter().map(|path| resolver.url_for(path)));
        resolver.initial_urls = initial_urls;

        Ok(resolver)
    }

    /// The normalized base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured root path, if any
    pub fn root_path(&self) -> Option<&str> {
        self.root_path.as_deref()
    }

    /// Returns true if a root path other than `""` or `"/"` is configured
    pub fn has_root_path(&self) -> bool {
        self.root_path.as_deref().map_or(false, is_root_path)
    }

    /// The landing page URL: base URL joined with the root path, or the base URL itself
    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    /// The first crawl round: the root URL followed by every initial path
    pub fn initial_urls(&self) -> &[String] {
        &self.initial_urls
    }

    /// Resolves a scraper-relative path into an absolute URL
    ///
    /// An empty path or `"/"` resolves to the root URL; anything else is joined
    /// onto the base URL. The result is in the same serialized form as links
    /// resolved from page content (percent-encoded, dot segments removed,
    /// default port dropped), so both map to one crawl history key.
    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() || path == "/" {
            return self.root_url.to_string();
        }

        let joined = join_url(self.base_url.as_str(), path);
        match Url::parse(&joined) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!("Keeping unparsable URL {} as written: {}", joined, e);
                joined
            }
        }
    }

    /// Returns the subpath of `url` relative to the base URL, if it lives under it
    pub fn subpath_of(&self, url: &Url) -> Option<String> {
        subpath_of(&self.base_url, url)
    }
}

/// Returns true if `path` names a real root page rather than the base itself
fn is_root_path(path: &str) -> bool {
    !path.is_empty() && path != "/"
}

/// Computes the subpath of `url` relative to `base_url`
///
/// Returns None when `url` is on a different origin or outside the base path.
/// The subpath has no leading slash and keeps the query string, but never the
/// fragment.
///
/// # Examples
///
/// ```
/// use doc_harvest::url::subpath_of;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs").unwrap();
/// let page = Url::parse("https://example.com/docs/guide/intro#setup").unwrap();
/// assert_eq!(subpath_of(&base, &page), Some("guide/intro".to_string()));
///
/// let outside = Url::parse("https://example.com/docsearch").unwrap();
/// assert_eq!(subpath_of(&base, &outside), None);
/// ```
pub fn subpath_of(base_url: &Url, url: &Url) -> Option<String> {
    let same_host = match (base_url.host_str(), url.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };

    if base_url.scheme() != url.scheme()
        || !same_host
        || base_url.port_or_known_default() != url.port_or_known_default()
    {
        return None;
    }

    let base_path = base_url.path();
    let path = url.path();

    let prefix = path.get(..base_path.len())?;
    if !prefix.eq_ignore_ascii_case(base_path) {
        return None;
    }

    let rest = &path[base_path.len()..];
    if !base_path.ends_with('/') && !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    let mut subpath = rest.trim_start_matches('/').to_string();
    if let Some(query) = url.query() {
        subpath.push('?');
        subpath.push_str(query);
    }

    Some(subpath)
}
