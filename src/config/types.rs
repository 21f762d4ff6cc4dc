use serde::Deserialize;

/// Main configuration structure for Outlink
///
/// Every section is optional in the TOML file; missing sections fall back
/// to their defaults so a crawl can run without any config file at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub canonical: CanonicalConfig,
    pub output: OutputConfig,
}

/// What to do with broken links once the frontier drains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RetryPolicy {
    /// Requeue broken links automatically, up to `max-retry-rounds` times
    Auto,
    /// Never retry; report broken links as-is
    Never,
    /// Ask the operator at every drain
    Prompt,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent page fetches
    pub workers: u32,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "read-timeout-secs")]
    pub read_timeout_secs: u64,

    /// Drain-time decision for broken links
    #[serde(rename = "retry-policy")]
    pub retry_policy: RetryPolicy,

    /// Upper bound on automatic retry rounds
    #[serde(rename = "max-retry-rounds")]
    pub max_retry_rounds: u32,

    /// Refuse to crawl when robots.txt cannot be fetched
    #[serde(rename = "require-robots")]
    pub require_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 30,
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            retry_policy: RetryPolicy::Prompt,
            max_retry_rounds: 3,
            require_robots: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// Agent token matched against robots.txt groups
    #[serde(rename = "robots-agent")]
    pub robots_agent: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "outlink".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/outlink/outlink".to_string(),
            contact_email: "outlink@example.com".to_string(),
            robots_agent: "*".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// URL identity rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanonicalConfig {
    /// Scheme every canonical key is rewritten to ("http" or "https")
    pub scheme: String,

    /// Strip a leading `www.` host label
    #[serde(rename = "strip-www")]
    pub strip_www: bool,
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            strip_www: true,
        }
    }
}

/// Report formats that can be emitted at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    Markdown,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the report files are written into
    pub directory: String,

    /// Which report writers run
    pub formats: Vec<ReportFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            formats: vec![ReportFormat::Html, ReportFormat::Markdown],
        }
    }
}
