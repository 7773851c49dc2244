//! Fetch deduplication
//!
//! A keyed latch over fetch outcomes. The first caller for a URL runs the
//! fetch and publishes the terminal value; concurrent callers for the same
//! URL wait on the same cell instead of issuing their own request. Errors are
//! stored as terminal values too, so repeated failing URLs are answered
//! immediately rather than retried. Nothing is evicted during a run.

use crate::http::FetchError;
use crate::page::FetchOutcome;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Terminal value for one URL: the outcome or the error, stored verbatim
pub type CachedFetch = Result<FetchOutcome, FetchError>;

#[derive(Default)]
pub struct FetchCache {
    cells: Mutex<HashMap<String, Arc<OnceCell<CachedFetch>>>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `url`, running `fetch` to produce it on
    /// the first call
    ///
    /// At most one fetch is ever in flight per URL; late callers block until
    /// the first one publishes its result.
    ///
    /// # Arguments
    ///
    /// * `url` - The cache key, expected to be fragment-less
    /// * `fetch` - Producer of the terminal value; invoked at most once
    pub async fn get_or_fetch<F, Fut>(&self, url: &str, fetch: F) -> CachedFetch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CachedFetch>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            cells.entry(url.to_string()).or_default().clone()
        };

        cell.get_or_init(fetch).await.clone()
    }
}
