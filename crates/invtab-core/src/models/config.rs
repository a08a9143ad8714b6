//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::normalize::{ColumnLibrary, ConflictPolicy};

/// Main configuration for the invtab pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvtabConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Table detection configuration.
    pub tables: TableConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Column normalization configuration.
    pub columns: ColumnConfig,

    /// Batch configuration.
    pub batch: BatchConfig,
}

/// How page images are produced for OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Use `pdftoppm`, fall back to embedded page images.
    #[default]
    Auto,
    /// Only `pdftoppm`.
    Pdftoppm,
    /// Only images embedded in the PDF (scanned documents).
    Embedded,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Page rasterizer.
    pub renderer: RendererKind,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: u32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            renderer: RendererKind::Auto,
            max_pages: 0,
        }
    }
}

/// Table detection method for the structured strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFlavor {
    /// Tables delimited by ruling lines.
    #[default]
    Lattice,
    /// Tables delimited by whitespace between aligned words.
    Stream,
    /// Lattice first, stream on pages without ruled tables.
    Auto,
}

/// Table detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Detection method.
    pub flavor: TableFlavor,

    /// Ruling lines closer than this are snapped to one coordinate.
    pub snap_tolerance: f64,

    /// Collinear ruling segments separated by less than this are joined.
    pub join_tolerance: f64,

    /// Ruling segments shorter than this are ignored.
    pub min_edge_length: f64,

    /// Slack when intersecting horizontal and vertical rulings.
    pub intersection_tolerance: f64,

    /// Horizontal slack when assigning words to cells.
    pub text_x_tolerance: f64,

    /// Vertical slack when assigning words to cells.
    pub text_y_tolerance: f64,

    /// Minimum number of vertically aligned words (rows) of a stream table.
    pub min_stream_rows: usize,

    /// Minimum number of columns of any detected table.
    pub min_columns: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            flavor: TableFlavor::Lattice,
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            min_edge_length: 3.0,
            intersection_tolerance: 3.0,
            text_x_tolerance: 3.0,
            text_y_tolerance: 3.0,
            min_stream_rows: 3,
            min_columns: 2,
        }
    }
}

/// OCR engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    /// The `tesseract` command-line program.
    #[default]
    Tesseract,
    /// PaddleOCR ONNX models through `pure-onnx-ocr`.
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine used by the OCR strategy.
    pub engine: OcrEngineKind,

    /// Tesseract language code.
    pub language: String,

    /// Tesseract page segmentation mode.
    pub psm: u32,

    /// Directory containing det.onnx, latin_rec.onnx and latin_dict.txt.
    pub model_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Tesseract,
            language: "eng".to_string(),
            psm: 6,
            model_dir: PathBuf::from("models"),
        }
    }
}

/// Column normalization configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Synonym library.
    pub library: ColumnLibrary,

    /// Resolution of headers claimed by several fields.
    pub conflict_policy: ConflictPolicy,
}

/// Batch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents processed concurrently (1 = sequential).
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

impl InvtabConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
