//! Progress indicators for model loading and embedding.
//!
//! Indicators draw to stderr and are hidden when stderr is not a terminal,
//! so piped output stays clean.

use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use std::time::Duration;

fn interactive() -> bool {
    std::io::stderr().is_terminal()
}

/// Create a styled progress bar counting embedded documents.
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    if !interactive() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a spinner for indeterminate progress.
pub fn create_spinner(message: &str) -> ProgressBar {
    if !interactive() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Show a spinner while `operation` runs.
pub fn with_spinner<F, T>(message: &str, operation: F) -> T
where
    F: FnOnce() -> T,
{
    let spinner = create_spinner(message);
    let result = operation();
    spinner.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_spinner_returns_result() {
        assert_eq!(with_spinner("working", || 42), 42);
    }

    #[test]
    fn test_progress_bar_counts() {
        let pb = create_progress_bar(3, "embedding");
        pb.set_position(2);
        assert_eq!(pb.position(), 2);
        pb.finish_and_clear();
    }
}
