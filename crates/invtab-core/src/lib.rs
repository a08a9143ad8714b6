//! Core library for invoice line-item extraction.
//!
//! This crate provides:
//! - PDF processing (content-stream geometry, page text, rasterization)
//! - Table detection on ruled and whitespace-aligned layouts
//! - OCR fallback with line-item recognition
//! - Column normalization onto a canonical invoice schema
//! - Batch orchestration with result reconciliation

pub mod batch;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod pdf;
pub mod table;

pub use batch::{BatchOrchestrator, BatchReport, BatchStatus, NoProgress, ProgressSink, ResultTable};
pub use error::{InvtabError, Result};
pub use extract::{ChainOutcome, ExtractionStrategy, StrategyChain, StrategyKind};
pub use models::config::InvtabConfig;
pub use models::document::Document;
pub use models::table::{CanonicalField, Extraction, LineItem, NormalizedTable, RawTable};
pub use normalize::{normalize_columns, normalize_table, ColumnLibrary, ConflictPolicy};
pub use ocr::OcrEngine;
pub use pdf::{PdfExtractor, PdfProcessor};
