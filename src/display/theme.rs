//! Color theme for terminal output.

use console::Style;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::sync::LazyLock;

/// Global theme instance shared by every command.
pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

/// Outcome marker printed ahead of a one-line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Done,
    Failed,
    Notice,
}

impl Status {
    fn icon(self) -> &'static str {
        match self {
            Status::Done => "✓",
            Status::Failed => "✗",
            Status::Notice => "⚠",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    pub header: Style,
    pub dim: Style,
    /// Rank labels in search output
    pub rank: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green().bright(),
            error: Style::new().red().bright(),
            warning: Style::new().yellow().bright(),
            header: Style::new().cyan().bold(),
            dim: Style::new().dim(),
            rank: Style::new().yellow().bold(),
        }
    }
}

impl Theme {
    /// `text` prefixed with the icon for `status`.
    pub fn status(&self, status: Status, text: &str) -> String {
        if Self::should_disable_colors() {
            return format!("{} {text}", status.icon());
        }
        match status {
            Status::Done => format!("{} {}", status.icon().green(), self.success.apply_to(text)),
            Status::Failed => format!("{} {}", status.icon().red(), self.error.apply_to(text)),
            Status::Notice => {
                format!("{} {}", status.icon().yellow(), self.warning.apply_to(text))
            }
        }
    }

    /// One search hit: `1. red dress`.
    pub fn ranked(&self, rank: usize, text: &str) -> String {
        format!("{} {text}", self.apply(&self.rank, format!("{rank}.")))
    }

    /// Colors are off when `NO_COLOR` is set or stdout is not a terminal.
    pub fn should_disable_colors() -> bool {
        std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal()
    }

    /// Style `text` unless colors are disabled.
    pub fn apply<T: std::fmt::Display>(&self, style: &Style, text: T) -> String {
        if Self::should_disable_colors() {
            text.to_string()
        } else {
            style.apply_to(text).to_string()
        }
    }
}
