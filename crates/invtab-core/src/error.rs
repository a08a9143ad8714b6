//! Error types for the invtab-core library.

use thiserror::Error;

/// Main error type for the invtab library.
#[derive(Error, Debug)]
pub enum InvtabError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Line-item extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to decode a page content stream.
    #[error("failed to read content of page {page}: {reason}")]
    Content { page: u32, reason: String },

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// Failed to rasterize pages.
    #[error("failed to render pages: {0}")]
    Render(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The OCR engine binary could not be started.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to line-item extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document could not be read from disk.
    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// A strategy panicked while processing a document.
    #[error("strategy panicked: {0}")]
    Panicked(String),

    /// No strategy produced any rows.
    #[error("no extractable data")]
    NoData,
}

/// Result type for the invtab library.
pub type Result<T> = std::result::Result<T, InvtabError>;
