//! Table detection on positioned page content and on extracted page text.
//!
//! Ruled and whitespace-aligned tables are found by pdfplumber's table
//! finder; [`text_layout`] splits tables out of plain page text.

pub mod text_layout;

use pdfplumber::{Page, Strategy, TableSettings};
use tracing::debug;

use crate::models::config::{TableConfig, TableFlavor};
use crate::models::table::RawTable;

/// pdfplumber settings for one detection strategy.
pub fn table_settings(config: &TableConfig, strategy: Strategy) -> TableSettings {
    TableSettings {
        strategy,
        snap_tolerance: config.snap_tolerance,
        snap_x_tolerance: config.snap_tolerance,
        snap_y_tolerance: config.snap_tolerance,
        join_tolerance: config.join_tolerance,
        join_x_tolerance: config.join_tolerance,
        join_y_tolerance: config.join_tolerance,
        edge_min_length: config.min_edge_length,
        min_words_vertical: config.min_stream_rows,
        text_x_tolerance: config.text_x_tolerance,
        text_y_tolerance: config.text_y_tolerance,
        intersection_tolerance: config.intersection_tolerance,
        intersection_x_tolerance: config.intersection_tolerance,
        intersection_y_tolerance: config.intersection_tolerance,
        ..TableSettings::default()
    }
}

/// Detect tables on one page (`page_number` is 1-indexed) with the configured flavor.
pub fn detect_tables(page: &Page, page_number: u32, config: &TableConfig) -> Vec<RawTable> {
    let tables = match config.flavor {
        TableFlavor::Lattice => find_tables(page, page_number, config, Strategy::Lattice),
        TableFlavor::Stream => find_tables(page, page_number, config, Strategy::Stream),
        TableFlavor::Auto => {
            let ruled = find_tables(page, page_number, config, Strategy::Lattice);
            if ruled.is_empty() {
                find_tables(page, page_number, config, Strategy::Stream)
            } else {
                ruled
            }
        }
    };

    debug!(
        "Page {}: {} tables ({:?})",
        page_number,
        tables.len(),
        config.flavor
    );
    tables
}

/// Tables with at least two rows and `min_columns` columns, cell text trimmed.
fn find_tables(page: &Page, page_number: u32, config: &TableConfig, strategy: Strategy) -> Vec<RawTable> {
    let min_columns = config.min_columns.max(1);

    page.find_tables(&table_settings(config, strategy))
        .iter()
        .map(|table| {
            let cells: Vec<Vec<String>> = table
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.text.as_deref().unwrap_or("").trim().to_string())
                        .collect()
                })
                .collect();
            RawTable::new(page_number, cells)
        })
        .filter(|raw| {
            raw.cells.len() >= 2 && raw.cells.iter().map(Vec::len).max().unwrap_or(0) >= min_columns
        })
        .collect()
}
