//! Table formatting for build and index summaries.

use comfy_table::{
    Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

use crate::indexing::BuildStats;
use crate::retrieve::IndexInfo;

fn metric_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Summary table for a finished build.
pub fn create_build_table(stats: &BuildStats) -> String {
    let mut table = metric_table();

    table.add_row(vec!["Documents", &stats.documents_indexed.to_string()]);
    table.add_row(vec!["Corpus size", &format_bytes(stats.bytes_read as u64)]);
    table.add_row(vec!["Model", &stats.model_name]);
    table.add_row(vec!["Dimension", &stats.dimension.to_string()]);
    table.add_row(vec!["Batches", &stats.batches.to_string()]);
    table.add_row(vec!["Time", &format!("{:.2}s", stats.elapsed.as_secs_f64())]);

    if stats.documents_indexed > 0 {
        table.add_row(vec![
            "Rate",
            &format!("{:.0} docs/second", stats.documents_per_second()),
        ]);
    }

    if let Some(path) = &stats.index_path {
        table.add_row(vec![
            Cell::new("Written to"),
            Cell::new(path.display()).fg(Color::Magenta),
        ]);
    }

    table.to_string()
}

/// Summary table for a persisted index.
pub fn create_info_table(info: &IndexInfo) -> String {
    let mut table = metric_table();

    table.add_row(vec![
        Cell::new("Path"),
        Cell::new(info.path.display()).fg(Color::Magenta),
    ]);
    table.add_row(vec!["Documents", &info.document_count.to_string()]);
    table.add_row(vec!["Dimension", &info.dimension.to_string()]);
    table.add_row(vec!["Index size", &format_bytes(info.index_bytes)]);
    table.add_row(vec![
        "Model",
        info.model_name.as_deref().unwrap_or("unknown"),
    ]);
    if let Some(created) = &info.created_at {
        table.add_row(vec!["Created", created]);
    }
    if let Some(sha) = &info.corpus_sha256 {
        table.add_row(vec!["Corpus SHA-256", &sha[..sha.len().min(16)]]);
    }

    table.to_string()
}
