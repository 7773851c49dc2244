//! sitemap.xml loading and parsing
//!
//! Understands the two document shapes of the sitemaps.org 0.9 protocol:
//! `urlset` files listing page locations, and `sitemapindex` files listing
//! child sitemaps. When the seed's sitemap is an index, each child is fetched
//! and its locations collected into one set.

use crate::checker::SitemapSet;
use crate::http::ThrottledClient;
use crate::{MuffetError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use url::Url;

/// A parsed sitemap document
#[derive(Debug, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<urlset>`: page locations
    Urlset(Vec<String>),
    /// `<sitemapindex>`: child sitemap locations
    Index(Vec<String>),
}

/// The set of page URLs listed by a site's sitemaps
pub struct SitemapUrls {
    urls: HashSet<String>,
}

impl SitemapUrls {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

impl SitemapSet for SitemapUrls {
    fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }
}

/// Parses a sitemap body as a urlset or a sitemap index
///
/// Returns `None` when the document is not a sitemap or lists no locations.
pub fn parse(body: &[u8]) -> Option<SitemapDocument> {
    let mut reader = Reader::from_reader(body);
    reader.trim_text(true);

    let mut buffer = Vec::new();
    let mut is_index = None;
    let mut in_location = false;
    let mut locations = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(element)) => match element.name().as_ref() {
                b"urlset" if is_index.is_none() => is_index = Some(false),
                b"sitemapindex" if is_index.is_none() => is_index = Some(true),
                b"loc" => in_location = true,
                _ => {}
            },
            Ok(Event::End(element)) => {
                if element.name().as_ref() == b"loc" {
                    in_location = false;
                }
            }
            Ok(Event::Text(text)) if in_location => {
                if let Ok(location) = text.unescape() {
                    let location = location.trim();

                    if !location.is_empty() {
                        locations.push(location.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }

        buffer.clear();
    }

    if locations.is_empty() {
        return None;
    }

    if is_index? {
        Some(SitemapDocument::Index(locations))
    } else {
        Some(SitemapDocument::Urlset(locations))
    }
}

/// Fetches the sitemap next to the seed URL and collects its page locations
pub async fn fetch(client: &ThrottledClient, seed: &Url) -> Result<SitemapUrls> {
    let mut url = seed.clone();
    url.set_path("/sitemap.xml");
    url.set_query(None);
    url.set_fragment(None);

    let body = fetch_body(client, &url).await?;
    let mut urls = HashSet::new();

    match parse(&body) {
        Some(SitemapDocument::Urlset(locations)) => urls.extend(locations),
        Some(SitemapDocument::Index(children)) => {
            for child in children {
                let child_url = Url::parse(&child)?;
                let body = fetch_body(client, &child_url).await?;

                if let Some(SitemapDocument::Urlset(locations)) = parse(&body) {
                    urls.extend(locations);
                }
            }
        }
        None => return Err(MuffetError::InvalidSitemap(url.to_string())),
    }

    Ok(SitemapUrls { urls })
}

async fn fetch_body(client: &ThrottledClient, url: &Url) -> Result<Vec<u8>> {
    Ok(client
        .get(url)
        .await
        .map_err(MuffetError::SitemapFetch)?
        .body)
}
