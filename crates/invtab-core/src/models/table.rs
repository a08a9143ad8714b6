//! Tabular data models shared by the extraction strategies and the batch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Standardized column names of the consolidated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    InvoiceNo,
    Date,
    Supplier,
    Item,
    Qty,
    Price,
    Total,
    Vat,
}

impl CanonicalField {
    /// All fields in declared order.
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::InvoiceNo,
        CanonicalField::Date,
        CanonicalField::Supplier,
        CanonicalField::Item,
        CanonicalField::Qty,
        CanonicalField::Price,
        CanonicalField::Total,
        CanonicalField::Vat,
    ];

    /// Column name used in output tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::InvoiceNo => "invoice_no",
            CanonicalField::Date => "date",
            CanonicalField::Supplier => "supplier",
            CanonicalField::Item => "item",
            CanonicalField::Qty => "qty",
            CanonicalField::Price => "price",
            CanonicalField::Total => "total",
            CanonicalField::Vat => "vat",
        }
    }

    /// Look up a field by its column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grid of cell strings produced by one strategy for one page.
///
/// The first row holds the header candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Page number (1-indexed) the table was found on.
    pub page: u32,
    /// Rows of cells, header first.
    pub cells: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(page: u32, cells: Vec<Vec<String>>) -> Self {
        Self { page, cells }
    }

    /// Header candidates (first row).
    pub fn header(&self) -> &[String] {
        self.cells.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        if self.cells.is_empty() {
            &[]
        } else {
            &self.cells[1..]
        }
    }

    /// Number of columns (widest row).
    pub fn num_cols(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// A table counts as detected when it has a header and at least one data row.
    pub fn has_data(&self) -> bool {
        !self.header().is_empty() && !self.body().is_empty()
    }
}

/// A table whose header labels went through the column normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
    /// Page number (1-indexed) the table was found on.
    pub page: u32,
    /// Column labels: canonical names where a synonym matched, original otherwise.
    pub columns: Vec<String>,
    /// Data rows, unchanged from the raw table.
    pub rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    /// Iterate a row as `(column, value)` pairs, padding short rows with empty values.
    pub fn row_pairs<'a>(&'a self, row: &'a [String]) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.columns
            .iter()
            .enumerate()
            .map(move |(i, col)| (col.as_str(), row.get(i).map(String::as_str).unwrap_or("")))
    }
}

/// A line item recognized by the OCR regex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item: String,
    pub qty: String,
    pub price: String,
    pub total: String,
}

/// Output of one successful extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Tables with original and normalized columns (structured and text-layout strategies).
    Tables(Vec<NormalizedTable>),
    /// Fixed-shape line items (OCR strategy).
    LineItems(Vec<LineItem>),
}

impl Extraction {
    /// Number of data rows carried by this extraction.
    pub fn row_count(&self) -> usize {
        match self {
            Extraction::Tables(tables) => tables.iter().map(|t| t.rows.len()).sum(),
            Extraction::LineItems(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}
