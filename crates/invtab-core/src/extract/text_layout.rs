//! Strategy 2: tables split out of each page's plain text.

use tracing::debug;

use super::structured::page_range;
use super::{ExtractionStrategy, StrategyKind};
use crate::error::Result;
use crate::models::config::ColumnConfig;
use crate::models::document::Document;
use crate::models::table::{Extraction, NormalizedTable};
use crate::normalize::normalize_table;
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::table::text_layout::parse_page;

/// One table per page from pdf-extract's text layout.
pub struct TextLayoutStrategy {
    columns: ColumnConfig,
    max_pages: u32,
}

impl TextLayoutStrategy {
    pub fn new(columns: ColumnConfig, max_pages: u32) -> Self {
        Self { columns, max_pages }
    }

    /// Tables from already-extracted page texts.
    pub fn tables_from_texts(&self, texts: &[String]) -> Vec<NormalizedTable> {
        page_range(texts.len() as u32, self.max_pages)
            .filter_map(|page| parse_page(page, &texts[(page - 1) as usize]))
            .filter(|raw| raw.has_data())
            .map(|raw| normalize_table(&raw, &self.columns.library, self.columns.conflict_policy))
            .collect()
    }
}

impl ExtractionStrategy for TextLayoutStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TextLayout
    }

    fn extract(&self, document: &Document) -> Result<Option<Extraction>> {
        let texts = PdfExtractor::from_bytes(&document.data)?.page_texts()?;
        let tables = self.tables_from_texts(&texts);

        debug!(
            "{}: {} text-layout tables from {} pages",
            document.file_name,
            tables.len(),
            texts.len()
        );
        Ok((!tables.is_empty()).then_some(Extraction::Tables(tables)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tables_from_texts() {
        let strategy = TextLayoutStrategy::new(ColumnConfig::default(), 0);
        let texts = vec![
            "Cover letter only".to_string(),
            "Description      Qty    Amount\nWidget A          10     50.00".to_string(),
        ];

        let tables = strategy.tables_from_texts(&texts);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].page, 2);
        assert_eq!(tables[0].columns, vec!["item", "qty", "total"]);
        assert_eq!(tables[0].rows, vec![vec!["Widget A", "10", "50.00"]]);
    }

    #[test]
    fn test_max_pages_limits_scan() {
        let strategy = TextLayoutStrategy::new(ColumnConfig::default(), 1);
        let texts = vec![
            String::new(),
            "Item   Qty\nBolt   4".to_string(),
        ];
        assert!(strategy.tables_from_texts(&texts).is_empty());
    }
}
