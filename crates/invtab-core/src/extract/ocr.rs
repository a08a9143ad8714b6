//! Strategy 3: rasterize, OCR, and scan the text for line items.

use tracing::{debug, warn};

use super::{ExtractionStrategy, StrategyKind};
use crate::error::{InvtabError, Result};
use crate::models::document::Document;
use crate::models::table::Extraction;
use crate::ocr::{parse_line_items, OcrEngine};
use crate::pdf::PageRenderer;

pub struct OcrStrategy {
    renderer: Box<dyn PageRenderer>,
    engine: Box<dyn OcrEngine>,
    max_pages: u32,
}

impl OcrStrategy {
    pub fn new(renderer: Box<dyn PageRenderer>, engine: Box<dyn OcrEngine>, max_pages: u32) -> Self {
        Self {
            renderer,
            engine,
            max_pages,
        }
    }

    /// OCR every page image; pages that fail are skipped unless all fail.
    fn recognize_pages(&self, document: &Document) -> Result<String> {
        let images = self.renderer.render(&document.data, self.max_pages)?;

        let mut texts = Vec::with_capacity(images.len());
        let mut first_error = None;
        for (i, image) in images.iter().enumerate() {
            match self.engine.recognize(image) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("{}: OCR failed on page {}: {}", document.file_name, i + 1, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) if texts.is_empty() => Err(InvtabError::Ocr(e)),
            _ => Ok(texts.join("\n")),
        }
    }
}

impl ExtractionStrategy for OcrStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ocr
    }

    fn extract(&self, document: &Document) -> Result<Option<Extraction>> {
        let text = self.recognize_pages(document)?;
        let items = parse_line_items(&text);

        debug!(
            "{}: {} line items via {} OCR",
            document.file_name,
            items.len(),
            self.engine.name()
        );
        Ok((!items.is_empty()).then_some(Extraction::LineItems(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, PdfError};
    use image::DynamicImage;
    use std::path::Path;

    struct Pages(usize);

    impl PageRenderer for Pages {
        fn render(&self, _data: &[u8], _max_pages: u32) -> crate::pdf::Result<Vec<DynamicImage>> {
            if self.0 == 0 {
                return Err(PdfError::Render("no renderer".to_string()));
            }
            Ok((0..self.0).map(|i| DynamicImage::new_luma8(i as u32 + 1, 1)).collect())
        }
        fn name(&self) -> &'static str {
            "pages"
        }
    }

    /// Recognizes an image by its width: 1 => first page text, 2 => second, other => error.
    struct ByWidth;

    impl OcrEngine for ByWidth {
        fn recognize(&self, image: &DynamicImage) -> std::result::Result<String, OcrError> {
            match image.width() {
                1 => Ok("Widget A 10 5.00 50.00".to_string()),
                2 => Ok("Gadget B 3 12.50 37.50".to_string()),
                _ => Err(OcrError::Recognition("unreadable".to_string())),
            }
        }
        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn document() -> Document {
        Document::from_bytes(Path::new("Scan_1.pdf"), Vec::new())
    }

    #[test]
    fn test_pages_are_joined() {
        let strategy = OcrStrategy::new(Box::new(Pages(2)), Box::new(ByWidth), 0);
        match strategy.extract(&document()).unwrap() {
            Some(Extraction::LineItems(items)) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].item, "Gadget B");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_failed_page_is_skipped() {
        let strategy = OcrStrategy::new(Box::new(Pages(3)), Box::new(ByWidth), 0);
        let extraction = strategy.extract(&document()).unwrap().unwrap();
        assert_eq!(extraction.row_count(), 2);
    }

    #[test]
    fn test_render_failure_is_error() {
        let strategy = OcrStrategy::new(Box::new(Pages(0)), Box::new(ByWidth), 0);
        assert!(matches!(strategy.extract(&document()), Err(InvtabError::Pdf(_))));
    }
}
