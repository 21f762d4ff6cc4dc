//! Robots.txt handling module
//!
//! The crawl root's robots.txt is fetched once, before any page is requested,
//! and every fetch and every discovered link is checked against it.

mod parser;

pub use parser::RobotsRules;

use crate::OutlinkError;
use reqwest::Client;
use url::Url;

/// Admission gate backed by the crawl root's robots.txt
#[derive(Debug, Clone)]
pub struct RobotsGate {
    rules: RobotsRules,
    agent: String,
}

impl RobotsGate {
    /// Builds a gate from already-parsed rules
    pub fn new(rules: RobotsRules, agent: impl Into<String>) -> Self {
        Self {
            rules,
            agent: agent.into(),
        }
    }

    /// Fetches `<origin>/robots.txt` for the seed and builds the gate
    ///
    /// An error status (>= 400) or a transport failure is fatal: the crawl
    /// must not start without robots guidance. With `require = false` the
    /// gate instead falls back to allow-all and logs a warning.
    pub async fn fetch(
        client: &Client,
        seed: &Url,
        agent: &str,
        require: bool,
    ) -> Result<Self, OutlinkError> {
        let robots_url = robots_url(seed)?;
        tracing::info!("Fetching robots.txt from {}", robots_url);

        match fetch_robots_body(client, &robots_url).await {
            Ok(body) => {
                tracing::info!("robots.txt found ({} bytes)", body.len());
                Ok(Self::new(RobotsRules::from_body(body), agent))
            }
            Err(reason) if require => Err(OutlinkError::RobotsUnavailable {
                url: robots_url.to_string(),
                reason,
            }),
            Err(reason) => {
                tracing::warn!(
                    "Could not retrieve {} ({}); continuing without robots rules",
                    robots_url,
                    reason
                );
                Ok(Self::new(RobotsRules::Unrestricted, agent))
            }
        }
    }

    /// Checks whether the URL may be fetched or admitted
    pub fn can_fetch(&self, url: &Url) -> bool {
        self.rules.permits(url.as_str(), &self.agent)
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn rules(&self) -> &RobotsRules {
        &self.rules
    }
}

/// Returns the robots.txt location for the origin of `seed`
pub fn robots_url(seed: &Url) -> Result<Url, OutlinkError> {
    Ok(seed.join("/robots.txt")?)
}

async fn fetch_robots_body(client: &Client, url: &Url) -> Result<String, String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(format!("HTTP {}", status.as_u16()));
    }

    response.text().await.map_err(|e| e.to_string())
}
