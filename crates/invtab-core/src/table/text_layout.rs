//! Tables recovered from the plain-text layout of a page.
//!
//! Text extractors keep column alignment as runs of spaces. A field is a run
//! of words separated by single spaces; two or more spaces (or a tab) start
//! the next field.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::table::RawTable;

lazy_static! {
    static ref FIELD: Regex = Regex::new(r"\S+(?: \S+)*").unwrap();
}

/// A field and its character offset within the line.
#[derive(Debug, Clone, PartialEq)]
struct Field {
    start: usize,
    text: String,
}

fn split_fields(line: &str) -> Vec<Field> {
    FIELD
        .find_iter(line)
        .map(|m| Field {
            start: line[..m.start()].chars().count(),
            text: m.as_str().to_string(),
        })
        .collect()
}

/// The longest run of multi-field lines; blank lines neither extend nor break a run.
fn largest_block(lines: &[Option<Vec<Field>>]) -> Vec<&Vec<Field>> {
    let mut best: Vec<&Vec<Field>> = Vec::new();
    let mut current: Vec<&Vec<Field>> = Vec::new();

    for line in lines {
        match line {
            None => continue,
            Some(fields) if fields.len() >= 2 => current.push(fields),
            Some(_) => {
                if current.len() > best.len() {
                    best = std::mem::take(&mut current);
                }
                current.clear();
            }
        }
    }
    if current.len() > best.len() {
        best = current;
    }
    best
}

/// Find the table on one page of extracted text.
///
/// Returns `None` unless the page holds a header line and at least one data
/// line that both split into two or more fields.
pub fn parse_page(page: u32, text: &str) -> Option<RawTable> {
    let lines: Vec<Option<Vec<Field>>> = text
        .lines()
        .map(|line| {
            let fields = split_fields(line);
            (!fields.is_empty()).then_some(fields)
        })
        .collect();

    let block = largest_block(&lines);
    if block.len() < 2 {
        return None;
    }

    // Column starts come from the first of the widest lines.
    let widest = block.iter().map(|fields| fields.len()).max().unwrap_or(0);
    let columns: Vec<usize> = block
        .iter()
        .find(|fields| fields.len() == widest)
        .map(|fields| fields.iter().map(|f| f.start).collect())
        .unwrap_or_default();

    let cells = block
        .iter()
        .map(|fields| {
            let mut row = vec![String::new(); columns.len()];
            for field in fields.iter() {
                let col = columns
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, start)| start.abs_diff(field.start))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                if !row[col].is_empty() {
                    row[col].push(' ');
                }
                row[col].push_str(&field.text);
            }
            row
        })
        .collect();

    Some(RawTable::new(page, cells))
}
