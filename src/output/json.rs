//! JSON output
//!
//! An array of page objects, each with the page URL and its link results.
//! Callers pass only the pages they want rendered; the command includes just
//! the failing ones.

use crate::result::PageResult;
use serde::Serialize;

#[derive(Serialize)]
#[serde(untagged)]
enum JsonLink<'a> {
    Success { url: &'a str, status: u16 },
    Error { url: &'a str, error: &'a str },
}

#[derive(Serialize)]
struct JsonPageResult<'a> {
    url: &'a str,
    links: Vec<JsonLink<'a>>,
}

impl<'a> From<&'a PageResult> for JsonPageResult<'a> {
    fn from(result: &'a PageResult) -> Self {
        let mut links = Vec::with_capacity(result.successes.len() + result.errors.len());

        links.extend(result.successes.iter().map(|link| JsonLink::Success {
            url: &link.url,
            status: link.status,
        }));
        links.extend(result.errors.iter().map(|link| JsonLink::Error {
            url: &link.url,
            error: &link.error,
        }));

        Self {
            url: &result.url,
            links,
        }
    }
}

/// Renders page results as a JSON array
pub fn format_json(results: &[PageResult]) -> serde_json::Result<String> {
    serde_json::to_string(&results.iter().map(JsonPageResult::from).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::LinkResult;

    #[test]
    fn renders_successes_and_errors() {
        let results = vec![PageResult::new(
            "http://foo.com",
            vec![
                LinkResult::success("http://foo.com/foo", 200),
                LinkResult::error("http://foo.com/bar", "baz"),
            ],
        )];

        assert_eq!(
            format_json(&results).unwrap(),
            r#"[{"url":"http://foo.com","links":[{"url":"http://foo.com/foo","status":200},{"url":"http://foo.com/bar","error":"baz"}]}]"#
        );
    }

    #[test]
    fn renders_an_empty_array() {
        assert_eq!(format_json(&[]).unwrap(), "[]");
    }
}
