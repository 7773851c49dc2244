//! robots.txt loading
//!
//! Fetches `<origin>/robots.txt` through the throttled client and wraps the
//! body in a matcher for the crawl agent. A failed fetch aborts the run; the
//! gate is opt-in, so a site without a robots.txt should simply not enable it.

use crate::checker::RobotsPolicy;
use crate::config;
use crate::http::ThrottledClient;
use crate::{MuffetError, Result};
use robotstxt::DefaultMatcher;
use url::Url;

/// Parsed robots.txt rules for the crawl agent
pub struct RobotsFilter {
    content: String,
}

impl RobotsFilter {
    pub fn new(content: String) -> Self {
        Self { content }
    }
}

impl RobotsPolicy for RobotsFilter {
    fn allows(&self, url: &Url) -> bool {
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, config::AGENT_NAME, url.as_str())
    }
}

/// Fetches and parses the robots.txt next to the seed URL
pub async fn fetch(client: &ThrottledClient, seed: &Url) -> Result<RobotsFilter> {
    let mut url = seed.clone();
    url.set_path("/robots.txt");
    url.set_query(None);
    url.set_fragment(None);

    let response = client.get(&url).await.map_err(MuffetError::RobotsFetch)?;

    Ok(RobotsFilter::new(
        String::from_utf8_lossy(&response.body).into_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn disallowed_paths_are_rejected() {
        let filter = RobotsFilter::new("User-agent: *\nDisallow: /admin".to_string());

        assert!(filter.allows(&url("https://foo.com/public")));
        assert!(!filter.allows(&url("https://foo.com/admin/panel")));
    }

    #[test]
    fn empty_rules_allow_everything() {
        let filter = RobotsFilter::new(String::new());
        assert!(filter.allows(&url("https://foo.com/anything")));
    }

    #[test]
    fn agent_specific_rules_apply() {
        let filter = RobotsFilter::new(
            "User-agent: muffet\nDisallow: /private\n\nUser-agent: *\nDisallow: /".to_string(),
        );

        assert!(filter.allows(&url("https://foo.com/public")));
        assert!(!filter.allows(&url("https://foo.com/private")));
    }
}
