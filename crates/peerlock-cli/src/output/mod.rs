//! Terminal output formatting and utilities.
//!
//! This module provides consistent output formatting across the CLI,
//! including colors, step messages, and error rendering.

pub mod errors;

use console::style;

/// Output handler for consistent terminal formatting.
pub struct OutputHandler;

impl OutputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn info(&self, message: &str) {
        println!("{}", style(message).dim());
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn warn(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn step(&self, message: &str) {
        println!("{} {}", style("→").cyan(), message);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
