//! Link discovery
//!
//! Walks a parsed HTML tree and yields every candidate URL it references:
//! anchors, media sources, stylesheets, scripts, frames and Open Graph
//! metadata. Values are normalised and resolved against the page base; a
//! value that cannot be parsed is kept with its error rather than dropped,
//! so broken markup still shows up in the results.

use crate::page::LinkError;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Elements scanned and the attribute each contributes
const ELEMENT_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("audio", "src"),
    ("embed", "src"),
    ("iframe", "src"),
    ("img", "src"),
    ("link", "href"),
    ("object", "data"),
    ("script", "src"),
    ("source", "src"),
    ("source", "srcset"),
    ("track", "src"),
    ("video", "src"),
];

/// Open Graph properties whose content is a URL
const META_PROPERTIES: &[&str] = &[
    "og:audio",
    "og:image",
    "og:image:secure_url",
    "og:image:url",
    "og:url",
    "og:video",
];

pub struct LinkFinder {
    excluded: Vec<Regex>,
    included: Vec<Regex>,
}

impl LinkFinder {
    pub fn new(excluded: Vec<Regex>, included: Vec<Regex>) -> Self {
        Self { excluded, included }
    }

    /// Collects candidate URLs from `document`, resolved against `base`
    ///
    /// Duplicates collapse to one entry. URLs with a non-HTTP(S) scheme and
    /// URLs removed by the exclude/include filters are dropped.
    ///
    /// # Returns
    ///
    /// A map from discovered URL string to an optional discovery-time error.
    ///
    /// # Example
    ///
    /// ```
    /// use muffet::checker::LinkFinder;
    /// use scraper::Html;
    /// use url::Url;
    ///
    /// let document = Html::parse_document(r#"<a href="/about">About</a>"#);
    /// let base = Url::parse("https://example.com/").unwrap();
    /// let links = LinkFinder::new(vec![], vec![]).find(&document, &base);
    ///
    /// assert!(links.contains_key("https://example.com/about"));
    /// ```
    pub fn find(&self, document: &Html, base: &Url) -> HashMap<String, Option<LinkError>> {
        let mut links = HashMap::new();

        for (element, attribute) in ELEMENT_ATTRIBUTES {
            let selector = match Selector::parse(&format!("{}[{}]", element, attribute)) {
                Ok(selector) => selector,
                Err(_) => continue,
            };

            for matched in document.select(&selector) {
                if let Some(value) = matched.value().attr(attribute) {
                    if *attribute == "srcset" {
                        for candidate in split_srcset(value) {
                            self.add_link(&mut links, candidate, base);
                        }
                    } else {
                        self.add_link(&mut links, value, base);
                    }
                }
            }
        }

        if let Ok(selector) = Selector::parse("meta[property][content]") {
            for matched in document.select(&selector) {
                let element = matched.value();

                if let (Some(property), Some(content)) =
                    (element.attr("property"), element.attr("content"))
                {
                    if META_PROPERTIES.contains(&property) {
                        self.add_link(&mut links, content, base);
                    }
                }
            }
        }

        links
    }

    fn add_link(&self, links: &mut HashMap<String, Option<LinkError>>, value: &str, base: &Url) {
        let value = value.trim();

        if value.is_empty() {
            return;
        }

        // spaces inside URLs are tolerated and percent-encoded
        let value = value.replace(' ', "%20");

        match base.join(&value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let url = url.to_string();

                if self.is_excluded(&url) || !self.is_included(&url) {
                    return;
                }

                links.entry(url).or_insert(None);
            }
            Ok(_) => {}
            Err(error) => {
                links.entry(value).or_insert(Some(error));
            }
        }
    }

    fn is_excluded(&self, url: &str) -> bool {
        self.excluded.iter().any(|pattern| pattern.is_match(url))
    }

    fn is_included(&self, url: &str) -> bool {
        self.included.is_empty() || self.included.iter().any(|pattern| pattern.is_match(url))
    }
}

/// Splits a `srcset` value into its URLs, discarding width/density descriptors
fn split_srcset(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://foo.com").unwrap()
    }

    fn find(body: &str) -> HashMap<String, Option<LinkError>> {
        find_with(LinkFinder::new(vec![], vec![]), body)
    }

    fn find_with(finder: LinkFinder, body: &str) -> HashMap<String, Option<LinkError>> {
        let document = Html::parse_document(&format!("<html><body>{}</body></html>", body));
        finder.find(&document, &base())
    }

    #[test]
    fn finds_links_in_scanned_elements() {
        for (html, count) in [
            ("", 0),
            (r#"<a href="" />"#, 0),
            (r#"<a href="/" />"#, 1),
            (r#"<a href="/foo" />"#, 1),
            (r#"<iframe src="/iframe"></iframe>"#, 1),
            (r#"<img src="/foo.jpg" />"#, 1),
            (r#"<link href="/link" />"#, 1),
            (r#"<script src="/foo.js"></script>"#, 1),
            (r#"<source src="/foo.png" />"#, 1),
            (r#"<source srcset="/foo.png" />"#, 1),
            (r#"<source src="/foo.png" srcset="/bar.png" />"#, 2),
            (r#"<track src="/foo.vtt" />"#, 1),
            (r#"<embed src="/embed" />"#, 1),
            (r#"<object data="/object" />"#, 1),
            (r#"<a href="/"><img src="/foo.png" /></a>"#, 2),
            (r#"<a href="/" /><a href="/" />"#, 1),
        ] {
            let links = find(html);

            assert_eq!(links.len(), count, "html: {}", html);
            assert!(links.values().all(Option::is_none), "html: {}", html);
        }
    }

    #[test]
    fn keeps_encoded_spaces() {
        let links = find(r#"<a href="http://foo.com/a%20b" />"#);
        assert_eq!(links.get("http://foo.com/a%20b"), Some(&None));
    }

    #[test]
    fn encodes_raw_spaces() {
        let links = find(r#"<a href="http://foo.com/a b" />"#);
        assert_eq!(links.get("http://foo.com/a%20b"), Some(&None));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let links = find(r#"<a href=" http://foo.com " />"#);
        assert_eq!(links.get("http://foo.com/"), Some(&None));
    }

    #[test]
    fn keeps_invalid_urls_with_their_error() {
        let links = find(r#"<a href=":" />"#);

        assert_eq!(links.len(), 1);
        assert!(links[":"].is_some());
    }

    #[test]
    fn drops_non_http_schemes() {
        for html in [
            r#"<a href="mailto:me@foo.com" />"#,
            r#"<a href="tel:+123456789" />"#,
            r#"<a href="javascript:void(0)" />"#,
        ] {
            assert!(find(html).is_empty(), "html: {}", html);
        }
    }

    #[test]
    fn splits_srcset_candidates() {
        let links = find(r#"<source srcset="foo.png, bar.png" />"#);

        assert_eq!(links.get("http://foo.com/foo.png"), Some(&None));
        assert_eq!(links.get("http://foo.com/bar.png"), Some(&None));
    }

    #[test]
    fn discards_srcset_descriptors() {
        let links = find(r#"<source srcset="foo.png 100w, bar.png 2x" />"#);

        assert_eq!(links.get("http://foo.com/foo.png"), Some(&None));
        assert_eq!(links.get("http://foo.com/bar.png"), Some(&None));
    }

    #[test]
    fn finds_open_graph_urls() {
        let document = Html::parse_document(
            r#"<html><head><meta property="og:image" content="foo.png" /></head><body /></html>"#,
        );
        let links = LinkFinder::new(vec![], vec![]).find(&document, &base());

        assert_eq!(links.get("http://foo.com/foo.png"), Some(&None));
    }

    #[test]
    fn ignores_non_url_meta_properties() {
        let document = Html::parse_document(
            r#"<html><head><meta property="og:title" content="title" /></head><body /></html>"#,
        );
        let links = LinkFinder::new(vec![], vec![]).find(&document, &base());

        assert!(links.is_empty());
    }

    #[test]
    fn excluded_patterns_remove_links() {
        let finder = LinkFinder::new(vec![Regex::new("foo").unwrap()], vec![]);
        assert!(find_with(finder, r#"<a href="/bar" />"#).is_empty());
    }

    #[test]
    fn included_patterns_keep_matching_links() {
        let finder = LinkFinder::new(vec![], vec![Regex::new("foo").unwrap()]);
        let links = find_with(finder, r#"<a href="/bar" />"#);

        assert_eq!(links.get("http://foo.com/bar"), Some(&None));
    }

    #[test]
    fn included_patterns_remove_non_matching_links() {
        let finder = LinkFinder::new(vec![], vec![Regex::new("baz").unwrap()]);
        assert!(find_with(finder, r#"<a href="/bar" />"#).is_empty());
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let finder = LinkFinder::new(
            vec![Regex::new("bar").unwrap()],
            vec![Regex::new("foo").unwrap()],
        );
        assert!(find_with(finder, r#"<a href="/bar" />"#).is_empty());
    }

    #[test]
    fn keeps_fragment_links() {
        let links = find(r##"<a href="#section" />"##);
        assert_eq!(links.get("http://foo.com/#section"), Some(&None));
    }
}
