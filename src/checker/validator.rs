//! Recursion gating
//!
//! Decides whether a discovered page should itself be expanded. A rejected
//! page is still reported as a link result of its parent; it just contributes
//! no links of its own. Robots and sitemap policies stay behind small traits
//! so the gate does not care how they were loaded.

use url::Url;

/// Answers whether the crawl agent may visit a URL
pub trait RobotsPolicy: Send + Sync {
    fn allows(&self, url: &Url) -> bool;
}

/// Membership test over the site's sitemap locations
pub trait SitemapSet: Send + Sync {
    fn contains(&self, url: &str) -> bool;
}

pub struct LinkValidator {
    hostname: String,
    robots: Option<Box<dyn RobotsPolicy>>,
    sitemap: Option<Box<dyn SitemapSet>>,
}

impl LinkValidator {
    pub fn new(
        hostname: String,
        robots: Option<Box<dyn RobotsPolicy>>,
        sitemap: Option<Box<dyn SitemapSet>>,
    ) -> Self {
        Self {
            hostname,
            robots,
            sitemap,
        }
    }

    /// True when the page behind `url` should be recursively expanded
    pub fn validate(&self, url: &Url) -> bool {
        if url.host_str() != Some(self.hostname.as_str()) {
            return false;
        }

        if let Some(robots) = &self.robots {
            if !robots.allows(url) {
                return false;
            }
        }

        if let Some(sitemap) = &self.sitemap {
            if !sitemap.contains(url.as_str()) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct DenyPaths(Vec<&'static str>);

    impl RobotsPolicy for DenyPaths {
        fn allows(&self, url: &Url) -> bool {
            !self.0.iter().any(|path| url.path().starts_with(path))
        }
    }

    impl SitemapSet for HashSet<String> {
        fn contains(&self, url: &str) -> bool {
            HashSet::contains(self, url)
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn accepts_same_host_urls() {
        let validator = LinkValidator::new("foo.com".to_string(), None, None);

        assert!(validator.validate(&url("https://foo.com/bar")));
        assert!(!validator.validate(&url("https://other.com/bar")));
    }

    #[test]
    fn subdomains_are_different_hosts() {
        let validator = LinkValidator::new("foo.com".to_string(), None, None);
        assert!(!validator.validate(&url("https://www.foo.com/")));
    }

    #[test]
    fn robots_policy_can_reject() {
        let validator = LinkValidator::new(
            "foo.com".to_string(),
            Some(Box::new(DenyPaths(vec!["/admin"]))),
            None,
        );

        assert!(validator.validate(&url("https://foo.com/public")));
        assert!(!validator.validate(&url("https://foo.com/admin/panel")));
    }

    #[test]
    fn sitemap_membership_gates_expansion() {
        let mut sitemap = HashSet::new();
        sitemap.insert("https://foo.com/listed".to_string());

        let validator =
            LinkValidator::new("foo.com".to_string(), None, Some(Box::new(sitemap)));

        assert!(validator.validate(&url("https://foo.com/listed")));
        assert!(!validator.validate(&url("https://foo.com/unlisted")));
    }
}
