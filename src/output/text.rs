//! Human-readable output
//!
//! One header line per page, one indented line per link. Successful links are
//! shown only in verbose mode.

use crate::result::PageResult;
use console::Style;

pub struct TextFormatter {
    verbose: bool,
    success: Style,
    error: Style,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            success: Style::new().green(),
            error: Style::new().red(),
        }
    }

    pub fn format(&self, result: &PageResult) -> String {
        let mut lines = vec![result.url.clone()];

        if self.verbose {
            for link in &result.successes {
                lines.push(format!(
                    "\t{}\t{}",
                    self.success.apply_to(link.status),
                    link.url
                ));
            }
        }

        for link in &result.errors {
            lines.push(format!(
                "\t{}\t{}",
                self.error.apply_to(&link.error),
                link.url
            ));
        }

        lines.join("\n")
    }
}
