//! Strategy 1: tables detected in the positioned page content.

use pdfplumber::Pdf;
use tracing::{debug, warn};

use super::{ExtractionStrategy, StrategyKind};
use crate::error::{PdfError, Result};
use crate::models::config::{ColumnConfig, TableConfig};
use crate::models::document::Document;
use crate::models::table::{Extraction, NormalizedTable};
use crate::normalize::normalize_table;
use crate::table::detect_tables;

/// Finds ruled or whitespace-aligned tables with pdfplumber.
pub struct StructuredTableStrategy {
    tables: TableConfig,
    columns: ColumnConfig,
    max_pages: u32,
}

impl StructuredTableStrategy {
    pub fn new(tables: TableConfig, columns: ColumnConfig, max_pages: u32) -> Self {
        Self {
            tables,
            columns,
            max_pages,
        }
    }
}

/// Pages `1..=n`, limited by `max_pages` when non-zero.
pub(crate) fn page_range(page_count: u32, max_pages: u32) -> std::ops::RangeInclusive<u32> {
    let last = match max_pages {
        0 => page_count,
        n => n.min(page_count),
    };
    1..=last
}

impl ExtractionStrategy for StructuredTableStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Structured
    }

    fn extract(&self, document: &Document) -> Result<Option<Extraction>> {
        let pdf = Pdf::open(&document.data, None).map_err(|e| PdfError::Parse(e.to_string()))?;
        if pdf.page_count() == 0 {
            return Err(PdfError::NoPages.into());
        }

        let mut tables: Vec<NormalizedTable> = Vec::new();
        for number in page_range(pdf.page_count() as u32, self.max_pages) {
            let page = match pdf.page((number - 1) as usize) {
                Ok(page) => page,
                Err(e) => {
                    let e = PdfError::Content {
                        page: number,
                        reason: e.to_string(),
                    };
                    warn!("{}: skipping page {}: {}", document.file_name, number, e);
                    continue;
                }
            };

            tables.extend(
                detect_tables(&page, number, &self.tables)
                    .iter()
                    .filter(|raw| raw.has_data())
                    .map(|raw| normalize_table(raw, &self.columns.library, self.columns.conflict_policy)),
            );
        }

        debug!("{}: {} structured tables", document.file_name, tables.len());
        Ok((!tables.is_empty()).then_some(Extraction::Tables(tables)))
    }
}
