//! Line-item recognition in OCR text.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::table::LineItem;

lazy_static! {
    /// Description starting with a letter, integer quantity, unit price, line total.
    /// Fields are separated by blanks on a single line.
    static ref LINE_ITEM: Regex =
        Regex::new(r"([A-Za-z].+?)[ \t]+(\d+)[ \t]+([\d.,]+)[ \t]+([\d.,]+)").unwrap();
}

/// Scan `text` for line items, in order of appearance.
pub fn parse_line_items(text: &str) -> Vec<LineItem> {
    let items: Vec<LineItem> = LINE_ITEM
        .captures_iter(text)
        .map(|caps| LineItem {
            item: caps[1].trim().to_string(),
            qty: caps[2].to_string(),
            price: caps[3].to_string(),
            total: caps[4].to_string(),
        })
        .collect();

    debug!("Found {} line items in {} chars of text", items.len(), text.len());
    items
}
