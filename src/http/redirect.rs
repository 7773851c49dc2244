//! Manual redirect following
//!
//! 3xx responses are chased by hand so the final status can be observed and
//! cookies set along the chain can be carried to the next hop. The cookie jar
//! lives for a single logical GET; no cookie state crosses requests.

use crate::http::client::{HttpClient, RawResponse};
use crate::http::FetchError;
use std::collections::HashMap;
use url::Url;

pub struct RedirectClient {
    client: HttpClient,
    max_redirections: usize,
}

impl RedirectClient {
    pub fn new(client: HttpClient, max_redirections: usize) -> Self {
        Self {
            client,
            max_redirections,
        }
    }

    /// Issues a GET, following redirects up to the configured bound
    ///
    /// Returns the final 2xx response. A terminal non-2xx status, a missing
    /// `Location` header, or too many hops all fail the fetch.
    /// Errors raised after the first hop are annotated with the URL at which
    /// redirection was being followed.
    pub async fn get(&self, url: &Url) -> Result<RawResponse, FetchError> {
        let mut cookies: HashMap<String, String> = HashMap::new();
        let mut current = url.clone();
        let mut redirections = 0;

        loop {
            let cookie_header = render_cookies(&cookies);

            let response = self
                .client
                .get(&current, cookie_header.as_deref())
                .await
                .map_err(|error| annotate(error, redirections, &current))?;

            match response.status {
                200..=299 => return Ok(response),
                300..=399 => {
                    redirections += 1;

                    if redirections > self.max_redirections {
                        return Err(FetchError::TooManyRedirections);
                    }

                    let location = response
                        .location
                        .as_deref()
                        .ok_or(FetchError::MissingLocation)?;

                    let next = current
                        .join(location)
                        .map_err(|error| annotate(error.into(), redirections, &current))?;

                    for cookie in &response.set_cookies {
                        if let Some((name, value)) = cookie.split_once('=') {
                            let value = value.split(';').next().unwrap_or("").trim();
                            cookies.insert(name.trim().to_string(), value.to_string());
                        }
                    }

                    tracing::debug!("following redirect from {} to {}", current, next);
                    current = next;
                }
                status => {
                    return Err(annotate(FetchError::Status(status), redirections, &current))
                }
            }
        }
    }
}

fn annotate(error: FetchError, redirections: usize, url: &Url) -> FetchError {
    if redirections == 0 {
        error
    } else {
        FetchError::Redirect {
            url: url.to_string(),
            source: Box::new(error),
        }
    }
}

fn render_cookies(cookies: &HashMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }

    Some(
        cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_hop_errors_are_not_annotated() {
        let url = Url::parse("https://example.com/").unwrap();
        let error = annotate(FetchError::Status(503), 0, &url);

        assert_eq!(error.to_string(), "503");
    }

    #[test]
    fn later_hop_errors_carry_the_redirect_url() {
        let url = Url::parse("https://example.com/moved").unwrap();
        let error = annotate(FetchError::Status(404), 2, &url);

        assert_eq!(error.to_string(), "https://example.com/moved (404)");
    }

    #[test]
    fn cookie_rendering_skips_attributes() {
        let mut cookies = HashMap::new();
        cookies.insert("session".to_string(), "abc123".to_string());

        assert_eq!(render_cookies(&cookies), Some("session=abc123".to_string()));
        assert_eq!(render_cookies(&HashMap::new()), None);
    }
}
