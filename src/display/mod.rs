//! Terminal display utilities for CLI output.
//!
//! Provides styled tables, progress indicators and the color theme.

pub mod progress;
pub mod tables;
pub mod theme;

pub use progress::{create_progress_bar, create_spinner, with_spinner};
pub use tables::{create_build_table, create_info_table, format_bytes};
pub use theme::{Status, THEME, Theme};
