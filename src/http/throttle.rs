//! Request throttling
//!
//! Enforces a global cap on in-flight requests, a per-host cap, and a
//! per-host request rate. Acquisition order is fixed: rate token first (may
//! sleep), then the per-host slot, then the global slot. Slots are released
//! in reverse order on every exit path, including errors.

use crate::config::ThrottleOptions;
use crate::http::client::RawResponse;
use crate::http::{FetchError, RedirectClient};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use url::Url;

pub struct ThrottledClient {
    client: RedirectClient,
    global_connections: Semaphore,
    hosts: Mutex<HashMap<String, Arc<HostThrottler>>>,
    max_connections_per_host: usize,
    rate_limit: Option<u32>,
}

impl ThrottledClient {
    pub fn new(client: RedirectClient, options: &ThrottleOptions) -> Self {
        Self {
            client,
            global_connections: Semaphore::new(options.max_connections),
            hosts: Mutex::new(HashMap::new()),
            max_connections_per_host: options.max_connections_per_host,
            rate_limit: options.rate_limit.filter(|limit| *limit > 0),
        }
    }

    /// Issues a throttled GET through the redirect layer
    pub async fn get(&self, url: &Url) -> Result<RawResponse, FetchError> {
        let throttler = self.host_throttler(url.host_str().unwrap_or("")).await;

        let _host_slot = throttler.acquire().await;
        let _global_slot = self
            .global_connections
            .acquire()
            .await
            .expect("connection semaphore closed");

        self.client.get(url).await
    }

    async fn host_throttler(&self, host: &str) -> Arc<HostThrottler> {
        let mut hosts = self.hosts.lock().await;

        hosts
            .entry(host.to_string())
            .or_insert_with(|| {
                Arc::new(HostThrottler::new(
                    self.max_connections_per_host,
                    self.rate_limit,
                ))
            })
            .clone()
    }
}

struct HostThrottler {
    connections: Semaphore,
    pacer: Option<Mutex<Pacer>>,
}

impl HostThrottler {
    fn new(max_connections: usize, rate_limit: Option<u32>) -> Self {
        Self {
            connections: Semaphore::new(max_connections),
            pacer: rate_limit
                .filter(|limit| *limit > 0)
                .map(|limit| Mutex::new(Pacer::new(limit))),
        }
    }

    /// Waits for a rate token, then takes a connection slot
    async fn acquire(&self) -> SemaphorePermit<'_> {
        if let Some(pacer) = &self.pacer {
            let wait = pacer.lock().await.schedule(Instant::now());

            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }

        self.connections
            .acquire()
            .await
            .expect("connection semaphore closed")
    }
}

/// Spaces requests evenly at the configured rate
///
/// Each caller reserves the next free send instant and sleeps until it
/// arrives, so bursts are smoothed instead of admitted in a window.
struct Pacer {
    interval: Duration,
    next_request: Instant,
}

impl Pacer {
    fn new(requests_per_second: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / requests_per_second,
            next_request: Instant::now(),
        }
    }

    fn schedule(&mut self, now: Instant) -> Duration {
        let wait = self.next_request.saturating_duration_since(now);
        self.next_request = now.max(self.next_request) + self.interval;
        wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_immediate() {
        let mut pacer = Pacer::new(10);
        assert_eq!(pacer.schedule(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn immediate_followup_waits_one_interval() {
        let mut pacer = Pacer::new(10);
        let now = Instant::now();

        assert_eq!(pacer.schedule(now), Duration::ZERO);
        assert_eq!(pacer.schedule(now), Duration::from_millis(100));
        assert_eq!(pacer.schedule(now), Duration::from_millis(200));
    }

    #[test]
    fn idle_time_resets_the_schedule() {
        let mut pacer = Pacer::new(10);
        let now = Instant::now();

        pacer.schedule(now);

        // a caller arriving well after the reserved slot pays no wait
        let later = now + Duration::from_secs(5);
        assert_eq!(pacer.schedule(later), Duration::ZERO);
    }

    #[tokio::test]
    async fn host_slots_bound_concurrency() {
        let throttler = HostThrottler::new(1, None);

        let first = throttler.acquire().await;

        let second = tokio::time::timeout(Duration::from_millis(50), throttler.acquire()).await;
        assert!(second.is_err(), "second acquire should block");

        drop(first);

        let third = tokio::time::timeout(Duration::from_millis(50), throttler.acquire()).await;
        assert!(third.is_ok(), "slot should be free after release");
    }

    #[test]
    fn zero_rate_limit_means_unlimited() {
        assert!(HostThrottler::new(4, Some(0)).pacer.is_none());
        assert!(HostThrottler::new(4, None).pacer.is_none());
        assert!(HostThrottler::new(4, Some(5)).pacer.is_some());
    }
}
