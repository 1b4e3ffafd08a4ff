//! Error message formatting with source-chain context.

use std::error::Error as StdError;

use console::style;

use crate::error::CliError;

pub struct ErrorFormatter;

impl ErrorFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, error: &CliError) -> String {
        let mut output = format!("{}: {}", style("error").red().bold(), error);

        let mut source = StdError::source(error);
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&format!("{}: {}", style("caused by").dim(), err));
            source = err.source();
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
