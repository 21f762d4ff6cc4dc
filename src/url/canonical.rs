use crate::config::CanonicalConfig;
use crate::UrlError;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// Reference prefixes that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// A discovered URL together with its identity key
///
/// The key is the collapsed form used for dedup and classification. The
/// resolved URL is what gets fetched and written to reports, so a link to
/// `https://www.example.com/a` is still requested over https even when the
/// key reads `http://example.com/a`.
///
/// Equality and hashing look at the key only.
#[derive(Debug, Clone)]
pub struct CanonicalUrl {
    key: String,
    url: Url,
}

impl CanonicalUrl {
    /// The canonical identity string
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The resolved URL (fragment removed, scheme and host untouched)
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The resolved URL as a string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl PartialEq for CanonicalUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CanonicalUrl {}

impl Hash for CanonicalUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Canonicalizes a raw reference found on a page
///
/// # Canonicalization Steps
///
/// 1. Reject non-crawlable references (`mailto:`, `tel:`, `javascript:`,
///    `data:`, fragment-only and empty hrefs)
/// 2. Resolve relative references against `base`; only http(s) results
///    with a host are accepted
/// 3. Drop the fragment
/// 4. Build the key: strip leading `www.` labels (when enabled) and rewrite
///    the scheme to the configured canonical scheme
///
/// The function is pure and idempotent: feeding a key back in yields the
/// same key.
///
/// # Examples
///
/// ```
/// use outlink::config::CanonicalConfig;
/// use outlink::url::canonicalize;
/// use url::Url;
///
/// let base = Url::parse("https://www.example.com/blog/").unwrap();
/// let url = canonicalize("../about#team", &base, &CanonicalConfig::default()).unwrap();
/// assert_eq!(url.key(), "http://example.com/about");
/// assert_eq!(url.as_str(), "https://www.example.com/about");
/// ```
pub fn canonicalize(
    raw: &str,
    base: &Url,
    options: &CanonicalConfig,
) -> Result<CanonicalUrl, UrlError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(UrlError::NotCrawlable("empty reference".to_string()));
    }

    // Same-page anchors
    if raw.starts_with('#') {
        return Err(UrlError::NotCrawlable(raw.to_string()));
    }

    let lowered = raw.to_ascii_lowercase();
    if SKIPPED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return Err(UrlError::NotCrawlable(raw.to_string()));
    }

    let mut resolved = base
        .join(raw)
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(UrlError::InvalidScheme(resolved.scheme().to_string()));
    }

    if resolved.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    resolved.set_fragment(None);

    let key = canonical_key(&resolved, options)?;
    Ok(CanonicalUrl { key, url: resolved })
}

/// Returns the canonical origin prefix of a seed URL
///
/// Every key that starts with this prefix belongs to the crawled site.
///
/// ```
/// use outlink::config::CanonicalConfig;
/// use outlink::url::root_prefix;
/// use url::Url;
///
/// let seed = Url::parse("https://www.example.com/blog/post").unwrap();
/// let root = root_prefix(&seed, &CanonicalConfig::default()).unwrap();
/// assert_eq!(root, "http://example.com/");
/// ```
pub fn root_prefix(seed: &Url, options: &CanonicalConfig) -> Result<String, UrlError> {
    let origin = canonicalize("/", seed, options)?;
    Ok(origin.key)
}

/// Builds the identity key for an already-resolved http(s) URL
fn canonical_key(resolved: &Url, options: &CanonicalConfig) -> Result<String, UrlError> {
    let mut key = resolved.clone();

    if options.strip_www {
        if let Some(host) = key.host_str() {
            let mut stripped = host;
            // Loop so that a key fed back in does not lose another label
            while let Some(rest) = stripped.strip_prefix("www.") {
                if rest.is_empty() {
                    break;
                }
                stripped = rest;
            }

            if stripped.len() != host.len() {
                let stripped = stripped.to_string();
                key.set_host(Some(&stripped))
                    .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;
            }
        }
    }

    if key.scheme() != options.scheme {
        key.set_scheme(&options.scheme)
            .map_err(|_| UrlError::InvalidScheme(options.scheme.clone()))?;
    }

    Ok(key.to_string())
}
