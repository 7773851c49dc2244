//! Fetched page representations
//!
//! A successful fetch yields a [`FetchOutcome`]: the final HTTP status plus,
//! when the content type matched a parser, a [`Page`] carrying the links
//! discovered in the document. Opaque resources (images, scripts, PDFs and so
//! on) report their status only and carry no page.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use url::Url;

/// Discovery-time error for a link value that could not be parsed as a URL
pub type LinkError = url::ParseError;

/// The kind of document a page was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Html,
    Sitemap,
}

/// A parsed page: its URL, fragment identifiers, and discovered links
///
/// The URL is always fragment-less. Links map each discovered URL string to an
/// optional discovery-time error; a link with an error is reported without
/// ever being fetched.
#[derive(Debug)]
pub struct Page {
    kind: PageKind,
    url: Url,
    fragments: HashSet<String>,
    links: HashMap<String, Option<LinkError>>,
}

impl Page {
    pub fn html(
        url: Url,
        fragments: HashSet<String>,
        links: HashMap<String, Option<LinkError>>,
    ) -> Self {
        Self {
            kind: PageKind::Html,
            url,
            fragments,
            links,
        }
    }

    pub fn sitemap(url: Url, links: HashMap<String, Option<LinkError>>) -> Self {
        Self {
            kind: PageKind::Sitemap,
            url,
            fragments: HashSet::new(),
            links,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn is_html(&self) -> bool {
        self.kind == PageKind::Html
    }

    pub fn links(&self) -> &HashMap<String, Option<LinkError>> {
        &self.links
    }

    /// True when the page contains an element with the given `id` or `name`
    pub fn has_fragment(&self, fragment: &str) -> bool {
        self.fragments.contains(fragment)
    }
}

/// The terminal result of fetching one URL
///
/// `status` is the final status after redirect resolution. `page` is present
/// only when the content type matched a parser.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: u16,
    pub page: Option<Arc<Page>>,
}
