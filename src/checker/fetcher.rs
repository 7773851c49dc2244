//! Link fetching
//!
//! Composes the HTTP stack, the page parser and the fetch cache. URLs are
//! split into a fragment-less base (the cache key) and a fragment identifier
//! that is verified against the fetched page's `id`/`name` set.

use crate::checker::cache::FetchCache;
use crate::checker::parser::PageParser;
use crate::http::{FetchError, ThrottledClient};
use crate::page::FetchOutcome;
use std::sync::Arc;
use url::Url;

pub struct LinkFetcher {
    client: Arc<ThrottledClient>,
    parser: PageParser,
    cache: FetchCache,
    ignore_fragments: bool,
}

impl LinkFetcher {
    pub fn new(client: Arc<ThrottledClient>, parser: PageParser, ignore_fragments: bool) -> Self {
        Self {
            client,
            parser,
            cache: FetchCache::new(),
            ignore_fragments,
        }
    }

    /// Fetches one URL and verifies its fragment, if any
    ///
    /// The fetch itself is keyed on the fragment-less URL, so `page#a` and
    /// `page#b` share a single request; only the fragment lookup differs.
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let (url, fragment) = separate_fragment(url)?;

        let outcome = self
            .cache
            .get_or_fetch(url.as_str(), || self.send_request(url.clone()))
            .await?;

        if let (Some(page), Some(fragment), false) =
            (&outcome.page, fragment, self.ignore_fragments)
        {
            if page.is_html() && !page.has_fragment(&fragment) {
                return Err(FetchError::FragmentNotFound(fragment));
            }
        }

        Ok(outcome)
    }

    async fn send_request(&self, url: Url) -> Result<FetchOutcome, FetchError> {
        let response = self.client.get(&url).await?;

        let page = self
            .parser
            .parse(&response.url, response.content_type.as_deref(), &response.body);

        Ok(FetchOutcome {
            status: response.status,
            page: page.map(Arc::new),
        })
    }
}

/// Splits a URL into its fragment-less form and an optional fragment
fn separate_fragment(url: &str) -> Result<(Url, Option<String>), FetchError> {
    let mut url = Url::parse(url)?;

    let fragment = url
        .fragment()
        .map(str::to_string)
        .filter(|fragment| !fragment.is_empty());
    url.set_fragment(None);

    Ok((url, fragment))
}
