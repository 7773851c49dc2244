//! Page parsing
//!
//! Dispatches a fetched body by media type. HTML documents yield a page with
//! fragment identifiers and discovered links; XML documents are tried as
//! sitemaps; anything else is opaque and yields no page at all.

use crate::checker::finder::LinkFinder;
use crate::page::Page;
use crate::sitemap::{self, SitemapDocument};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

pub struct PageParser {
    finder: LinkFinder,
}

impl PageParser {
    pub fn new(finder: LinkFinder) -> Self {
        Self { finder }
    }

    /// Parses a response body according to its `Content-Type`
    ///
    /// A missing content type is treated as HTML; media type parameters such
    /// as `charset` are ignored.
    ///
    /// # Arguments
    ///
    /// * `url` - The final URL the body was fetched from
    /// * `content_type` - The raw `Content-Type` header value, if any
    /// * `body` - The response body
    ///
    /// # Returns
    ///
    /// * `Some(Page)` - An HTML or sitemap page with its discovered links
    /// * `None` - The content is opaque; only its status is reportable
    pub fn parse(&self, url: &Url, content_type: Option<&str>, body: &[u8]) -> Option<Page> {
        let media_type = content_type
            .map(|value| value.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

        match media_type.as_deref() {
            None | Some("") | Some("text/html") => Some(self.parse_html(url, body)),
            Some("application/xml") | Some("text/xml") => self.parse_sitemap(url, body),
            Some(_) => None,
        }
    }

    fn parse_html(&self, url: &Url, body: &[u8]) -> Page {
        let text = String::from_utf8_lossy(body);
        let document = Html::parse_document(&text);

        let mut fragments = HashSet::new();

        if let Ok(selector) = Selector::parse("*") {
            for matched in document.select(&selector) {
                for attribute in ["id", "name"] {
                    if let Some(value) = matched.value().attr(attribute) {
                        if !value.is_empty() {
                            fragments.insert(value.to_string());
                        }
                    }
                }
            }
        }

        let mut page_url = url.clone();
        page_url.set_fragment(None);

        let base = resolve_base(&document, &page_url);
        let links = self.finder.find(&document, &base);

        Page::html(page_url, fragments, links)
    }

    fn parse_sitemap(&self, url: &Url, body: &[u8]) -> Option<Page> {
        let locations = match sitemap::parse(body)? {
            SitemapDocument::Urlset(locations) => locations,
            SitemapDocument::Index(locations) => locations,
        };

        let mut page_url = url.clone();
        page_url.set_fragment(None);

        Some(Page::sitemap(
            page_url,
            locations
                .into_iter()
                .map(|location| (location, None))
                .collect(),
        ))
    }
}

/// The base for resolving relative links: the page URL, overridden by the
/// first `<base href>` in the document
fn resolve_base(document: &Html, page_url: &Url) -> Url {
    if let Ok(selector) = Selector::parse("base[href]") {
        if let Some(element) = document.select(&selector).next() {
            if let Some(href) = element.value().attr("href") {
                if let Ok(resolved) = page_url.join(href.trim()) {
                    return resolved;
                }
            }
        }
    }

    page_url.clone()
}
