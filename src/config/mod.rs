//! Defaults and option structures shared across the HTTP and checker layers

use reqwest::header::HeaderMap;
use std::time::Duration;

/// User agent and robots.txt agent token
pub const AGENT_NAME: &str = "muffet";

/// Number of page-expansion workers
pub const DEFAULT_CONCURRENCY: usize = 4096;

/// Per-request cap on response body bytes
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024 * 1024;

pub const DEFAULT_MAX_CONNECTIONS: usize = 512;
pub const DEFAULT_MAX_CONNECTIONS_PER_HOST: usize = 512;
pub const DEFAULT_MAX_REDIRECTIONS: usize = 64;

/// Per-request timeout covering the whole response
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP connect timeout
pub const TCP_TIMEOUT: Duration = Duration::from_secs(60);

/// Options for the base HTTP transport
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Maximum response body size in bytes; larger bodies fail the fetch
    pub buffer_size: usize,

    /// Timeout for a single request
    pub timeout: Duration,

    /// Proxy URL, if any
    pub proxy: Option<String>,

    /// Disable TLS certificate verification
    pub skip_tls_verification: bool,

    /// Static headers attached to every request
    pub headers: HeaderMap,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            skip_tls_verification: false,
            headers: HeaderMap::new(),
        }
    }
}

/// Options for the throttling layer
#[derive(Debug, Clone)]
pub struct ThrottleOptions {
    /// Global cap on concurrent in-flight requests
    pub max_connections: usize,

    /// Per-host cap on concurrent in-flight requests
    pub max_connections_per_host: usize,

    /// Per-host requests per second; `None` means unlimited
    pub rate_limit: Option<u32>,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_connections_per_host: DEFAULT_MAX_CONNECTIONS_PER_HOST,
            rate_limit: None,
        }
    }
}
