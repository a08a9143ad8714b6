//! Aligning per-document rows onto one result schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::document::UNKNOWN_SUPPLIER;
use crate::models::table::{CanonicalField, Extraction};

/// Provenance column appended to every record.
pub const FILE_NAME_COLUMN: &str = "file_name";

/// A row as ordered `(column, value)` pairs; a repeated column keeps its last value.
pub type Row = Vec<(String, String)>;

/// Rows extracted from one document, before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRows {
    pub file_name: String,
    pub rows: Vec<Row>,
}

fn set(row: &mut Row, column: &str, value: String) {
    match row.iter_mut().find(|(c, _)| c == column) {
        Some((_, v)) => *v = value,
        None => row.push((column.to_string(), value)),
    }
}

fn get<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.iter().find(|(c, _)| c == column).map(|(_, v)| v.as_str())
}

/// Flatten an extraction into rows, stamped with supplier and file name.
///
/// Blank header labels become `column_N` (1-indexed). The supplier column
/// keeps an extracted non-blank value and otherwise gets `supplier_guess`.
pub fn rows_from_extraction(
    extraction: &Extraction,
    supplier_guess: &str,
    file_name: &str,
) -> Vec<Row> {
    let mut rows: Vec<Row> = match extraction {
        Extraction::Tables(tables) => tables
            .iter()
            .flat_map(|table| {
                table.rows.iter().map(move |cells| {
                    let width = cells.len().max(table.columns.len());
                    let mut row = Row::with_capacity(width + 2);
                    for i in 0..width {
                        let label = table
                            .columns
                            .get(i)
                            .map(|c| c.trim())
                            .filter(|c| !c.is_empty())
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("column_{}", i + 1));
                        let value = cells.get(i).cloned().unwrap_or_default();
                        set(&mut row, &label, value);
                    }
                    row
                })
            })
            .collect(),
        Extraction::LineItems(items) => items
            .iter()
            .map(|item| {
                vec![
                    (CanonicalField::Item.as_str().to_string(), item.item.clone()),
                    (CanonicalField::Qty.as_str().to_string(), item.qty.clone()),
                    (CanonicalField::Price.as_str().to_string(), item.price.clone()),
                    (CanonicalField::Total.as_str().to_string(), item.total.clone()),
                ]
            })
            .collect(),
    };

    let supplier_column = CanonicalField::Supplier.as_str();
    let fallback = match supplier_guess.trim() {
        "" => UNKNOWN_SUPPLIER,
        guess => guess,
    };
    for row in &mut rows {
        let has_supplier = get(row, supplier_column).is_some_and(|v| !v.trim().is_empty());
        if !has_supplier {
            set(row, supplier_column, fallback.to_string());
        }
        set(row, FILE_NAME_COLUMN, file_name.to_string());
    }
    rows
}

/// The concatenated, schema-aligned output of a batch.
///
/// Columns are all canonical fields in declared order, then pass-through
/// columns in first-seen order, then `file_name`. Every record has a value
/// (possibly empty) for every column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
}

impl ResultTable {
    /// Reconcile document rows, keeping document order then row order.
    pub fn from_documents(documents: &[DocumentRows]) -> Self {
        let mut columns: Vec<String> = CanonicalField::ALL
            .iter()
            .map(|f| f.as_str().to_string())
            .collect();
        for doc in documents {
            for row in &doc.rows {
                for (column, _) in row {
                    if column != FILE_NAME_COLUMN && !columns.contains(column) {
                        columns.push(column.clone());
                    }
                }
            }
        }
        columns.push(FILE_NAME_COLUMN.to_string());

        let index: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let records = documents
            .iter()
            .flat_map(|doc| doc.rows.iter())
            .map(|row| {
                let mut record = vec![String::new(); columns.len()];
                for (column, value) in row {
                    record[index[column.as_str()]] = value.clone();
                }
                record
            })
            .collect();

        Self { columns, records }
    }

    /// Column names in output order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Records aligned with [`column_names`](Self::column_names).
    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All values of one column, in record order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let i = self.columns.iter().position(|c| c == name)?;
        Some(self.records.iter().map(|r| r[i].as_str()).collect())
    }

    /// Column name to values, in column order.
    pub fn columns(&self) -> Vec<(&str, Vec<&str>)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                (
                    name.as_str(),
                    self.records.iter().map(|r| r[i].as_str()).collect(),
                )
            })
            .collect()
    }

    /// Records as JSON objects keyed by column name.
    pub fn to_json_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.records
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .zip(record)
                    .map(|(c, v)| (c.clone(), serde_json::Value::String(v.clone())))
                    .collect()
            })
            .collect()
    }
}
