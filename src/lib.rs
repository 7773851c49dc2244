//! Muffet: a website link-health checker
//!
//! Given a seed URL, this crate discovers every page reachable from that seed,
//! fetches each referenced resource, and reports per-page results that
//! distinguish working links from broken ones.

pub mod checker;
pub mod config;
pub mod http;
pub mod output;
pub mod page;
pub mod result;
pub mod robots;
pub mod sitemap;

use thiserror::Error;

/// Top-level error type for a check run
///
/// Errors of this type abort the run. Failures on individual links never do;
/// those are recorded in the page results instead.
#[derive(Debug, Error)]
pub enum MuffetError {
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("failed to fetch root page: {0}")]
    RootFetch(#[source] http::FetchError),

    #[error("root page is not HTML")]
    RootNotHtml,

    #[error("failed to fetch robots.txt: {0}")]
    RobotsFetch(#[source] http::FetchError),

    #[error("failed to fetch sitemap: {0}")]
    SitemapFetch(#[source] http::FetchError),

    #[error("invalid sitemap at {0}")]
    InvalidSitemap(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for check operations
pub type Result<T> = std::result::Result<T, MuffetError>;

// Re-export commonly used types
pub use page::{FetchOutcome, Page};
pub use result::{LinkResult, PageResult};
