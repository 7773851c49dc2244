//! Per-page result types

/// A link that resolved to a 2xx response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessLink {
    pub url: String,
    pub status: u16,
}

/// A link that failed, with its error rendered for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLink {
    pub url: String,
    pub error: String,
}

/// The outcome of checking a single link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResult {
    Success(SuccessLink),
    Error(ErrorLink),
}

impl LinkResult {
    pub fn success(url: impl Into<String>, status: u16) -> Self {
        Self::Success(SuccessLink {
            url: url.into(),
            status,
        })
    }

    pub fn error(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error(ErrorLink {
            url: url.into(),
            error: error.into(),
        })
    }
}

/// Aggregated results for one checked page
///
/// Exactly one of these is emitted per expanded page. A link appears in
/// either the success list or the error list, never both.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub url: String,
    pub successes: Vec<SuccessLink>,
    pub errors: Vec<ErrorLink>,
}

impl PageResult {
    pub fn new(url: impl Into<String>, links: Vec<LinkResult>) -> Self {
        let mut successes = Vec::new();
        let mut errors = Vec::new();

        for link in links {
            match link {
                LinkResult::Success(link) => successes.push(link),
                LinkResult::Error(link) => errors.push(link),
            }
        }

        Self {
            url: url.into(),
            successes,
            errors,
        }
    }

    /// True when the page has no broken links
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}
