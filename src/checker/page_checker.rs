//! Crawl orchestration
//!
//! Each expansion task fetches every link of one page concurrently, emits a
//! single [`PageResult`] once all of them resolve, and schedules validated
//! child pages on the task pool. Pages are deduplicated through a done set,
//! so each page is expanded at most once per run.

use crate::checker::fetcher::LinkFetcher;
use crate::checker::pool::{Task, TaskHandle, TaskPool};
use crate::checker::validator::LinkValidator;
use crate::config;
use crate::page::{LinkError, Page};
use crate::result::{LinkResult, PageResult};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::Mutex;

pub struct PageChecker {
    state: Arc<CheckState>,
    pool: TaskPool,
}

struct CheckState {
    fetcher: Arc<LinkFetcher>,
    validator: LinkValidator,
    results: Sender<PageResult>,
    done_pages: Mutex<HashSet<String>>,
    tasks: TaskHandle,
    one_page_only: bool,
}

impl CheckState {
    /// Records that an expansion has been scheduled for a page URL
    ///
    /// Returns false when the page was already scheduled.
    async fn mark_done(&self, url: &str) -> bool {
        self.done_pages.lock().await.insert(url.to_string())
    }
}

impl PageChecker {
    /// Creates a checker and the stream its page results arrive on
    pub fn new(
        fetcher: Arc<LinkFetcher>,
        validator: LinkValidator,
        one_page_only: bool,
    ) -> (Self, Receiver<PageResult>) {
        let pool = TaskPool::new(config::DEFAULT_CONCURRENCY);
        let (results, receiver) = mpsc::channel(config::DEFAULT_CONCURRENCY);

        let state = Arc::new(CheckState {
            fetcher,
            validator,
            results,
            done_pages: Mutex::new(HashSet::new()),
            tasks: pool.handle(),
            one_page_only,
        });

        (Self { state, pool }, receiver)
    }

    /// Crawls from the root page until every reachable page has been checked
    ///
    /// The results channel closes once the last page result has been emitted.
    pub async fn check(self, root: Arc<Page>) {
        self.state.mark_done(root.url().as_str()).await;
        self.state.tasks.add(check_page(self.state.clone(), root));

        self.pool.run().await;

        // dropping the state here drops the last results sender, which closes
        // the channel for the consumer
    }
}

fn check_page(state: Arc<CheckState>, page: Arc<Page>) -> Task {
    Box::pin(async move {
        tracing::debug!("checking page {}", page.url());

        let links = join_all(page.links().iter().map(|(url, discovery_error)| {
            check_link(state.clone(), url.clone(), discovery_error.clone())
        }))
        .await;

        let result = PageResult::new(page.url().as_str(), links);
        let _ = state.results.send(result).await;
    })
}

async fn check_link(
    state: Arc<CheckState>,
    url: String,
    discovery_error: Option<LinkError>,
) -> LinkResult {
    if let Some(error) = discovery_error {
        return LinkResult::error(url, error.to_string());
    }

    match state.fetcher.fetch(&url).await {
        Ok(outcome) => {
            if !state.one_page_only {
                if let Some(child) = &outcome.page {
                    if state.validator.validate(child.url())
                        && state.mark_done(child.url().as_str()).await
                    {
                        state.tasks.add(check_page(state.clone(), child.clone()));
                    }
                }
            }

            LinkResult::success(url, outcome.status)
        }
        Err(error) => LinkResult::error(url, error.to_string()),
    }
}
