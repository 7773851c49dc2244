//! Base HTTP transport
//!
//! Issues a single GET without following redirects and reads the full
//! response body, bounded by the configured buffer size.

use crate::config::{self, ClientOptions};
use crate::http::FetchError;
use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use url::Url;

/// One fully-read HTTP response
#[derive(Debug)]
pub struct RawResponse {
    /// Final request URL
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub location: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: Vec<u8>,
}

pub struct HttpClient {
    client: reqwest::Client,
    buffer_size: usize,
}

impl HttpClient {
    pub fn new(options: &ClientOptions) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config::AGENT_NAME)
            .redirect(Policy::none()) // redirects are followed a layer up
            .timeout(options.timeout)
            .connect_timeout(config::TCP_TIMEOUT)
            .default_headers(options.headers.clone())
            .danger_accept_invalid_certs(options.skip_tls_verification)
            .gzip(true)
            .brotli(true);

        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            buffer_size: options.buffer_size,
        })
    }

    /// Issues a single GET and reads the whole body
    ///
    /// `cookies` is an optional pre-rendered `Cookie` header value; the
    /// redirect layer uses it to carry cookies across hops.
    pub async fn get(&self, url: &Url, cookies: Option<&str>) -> Result<RawResponse, FetchError> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url.clone());

        if let Some(cookies) = cookies {
            request = request.header(COOKIE, cookies);
        }

        let mut response = request.send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = header_value(&response, CONTENT_TYPE);
        let location = header_value(&response, LOCATION);
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        let mut body = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.buffer_size {
                return Err(FetchError::BodyTooLarge);
            }

            body.extend_from_slice(&chunk);
        }

        Ok(RawResponse {
            url: final_url,
            status,
            content_type,
            location,
            set_cookies,
            body,
        })
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
