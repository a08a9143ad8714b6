//! PDF processing module.
//!
//! Loads documents with lopdf, extracts plain page text with pdf-extract and
//! turns pages into images for OCR. Positioned page content for table
//! detection comes from pdfplumber (see [`crate::table`]).

mod extractor;
mod render;

pub use extractor::PdfExtractor;
#[cfg(test)]
pub(crate) use extractor::tests::{build_pdf, ruled_grid, text_ops};
pub use render::{
    create_renderer, EmbeddedImageRenderer, FallbackRenderer, PageRenderer, PdftoppmRenderer,
};

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Plain text of every page, in page order.
    fn page_texts(&self) -> Result<Vec<String>>;

    /// Extract embedded images from a page.
    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>>;
}
