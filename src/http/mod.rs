//! The HTTP client stack
//!
//! Three composed layers, innermost first: [`HttpClient`] issues one GET and
//! reads the whole body, [`RedirectClient`] follows 3xx responses manually,
//! and [`ThrottledClient`] enforces global and per-host connection limits plus
//! a per-host request rate.

mod client;
mod redirect;
mod throttle;

pub use client::{HttpClient, RawResponse};
pub use redirect::RedirectClient;
pub use throttle::ThrottledClient;

use std::sync::Arc;
use thiserror::Error;

/// A failure while fetching one URL
///
/// Cloneable so it can be stored as a terminal value in the fetch cache:
/// repeated failing URLs are answered from the cache, not retried.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Non-2xx terminal status; displays as the bare numeric code
    #[error("{0}")]
    Status(u16),

    #[error("too many redirections")]
    TooManyRedirections,

    #[error("location header not set")]
    MissingLocation,

    #[error("response body too large")]
    BodyTooLarge,

    /// An error encountered while a redirect was being followed
    #[error("{url} ({source})")]
    Redirect {
        url: String,
        #[source]
        source: Box<FetchError>,
    },

    /// A fragment identifier that does not exist on the fetched page
    #[error("id #{0} not found")]
    FragmentNotFound(String),

    #[error("{0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Transport(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(Arc::new(error))
    }
}
