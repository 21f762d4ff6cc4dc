//! Robots.txt rule evaluation
//!
//! The crawl root's robots.txt is kept as its raw body and handed to the
//! robotstxt matcher on every check.

use robotstxt::DefaultMatcher;

/// Rules a [`super::RobotsGate`] admits URLs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsRules {
    /// No robots.txt could be retrieved and the operator allowed that
    Unrestricted,
    /// Body of the retrieved robots.txt
    Body(String),
}

impl RobotsRules {
    pub fn from_body(body: impl Into<String>) -> Self {
        Self::Body(body.into())
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Whether `agent` may fetch `url`
    ///
    /// `url` may be absolute or a bare path; only its path and query are
    /// matched. An empty or unparseable body permits everything.
    pub fn permits(&self, url: &str, agent: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Body(body) if body.trim().is_empty() => true,
            Self::Body(body) => {
                DefaultMatcher::default().one_agent_allowed_by_robots(body, agent, url)
            }
        }
    }
}
