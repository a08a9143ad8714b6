//! Extraction strategies and the chain that runs them in priority order.

mod chain;
mod ocr;
mod structured;
mod text_layout;

pub use chain::StrategyChain;
pub use ocr::OcrStrategy;
pub use structured::StructuredTableStrategy;
pub use text_layout::TextLayoutStrategy;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::document::Document;
use crate::models::table::Extraction;

/// Identifies an extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Tables found in the positioned page content.
    Structured,
    /// Tables split out of the plain-text page layout.
    TextLayout,
    /// Line items recognized in OCR text.
    Ocr,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Structured => "structured",
            StrategyKind::TextLayout => "text_layout",
            StrategyKind::Ocr => "ocr",
        };
        f.write_str(name)
    }
}

/// One way of getting rows out of a document.
///
/// `Ok(Some(_))` is a success, `Ok(None)` means the strategy ran but found
/// nothing, `Err(_)` means it could not run on this document.
pub trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn extract(&self, document: &Document) -> Result<Option<Extraction>>;
}

/// Outcome of one strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum AttemptStatus {
    Succeeded { rows: usize },
    Empty,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub strategy: StrategyKind,
    #[serde(flatten)]
    pub status: AttemptStatus,
}

/// Everything the chain did for one document.
#[derive(Debug, Clone, Default)]
pub struct ChainOutcome {
    /// Attempts in the order they ran.
    pub attempts: Vec<Attempt>,
    /// The first successful extraction, if any.
    pub extraction: Option<(StrategyKind, Extraction)>,
}

impl ChainOutcome {
    pub fn succeeded(&self) -> bool {
        self.extraction.is_some()
    }

    pub fn strategy(&self) -> Option<StrategyKind> {
        self.extraction.as_ref().map(|(kind, _)| *kind)
    }

    /// Describe why nothing was extracted, for document warnings.
    pub fn failure_summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no extraction strategies configured".to_string();
        }
        self.attempts
            .iter()
            .map(|a| match &a.status {
                AttemptStatus::Succeeded { rows } => format!("{}: {} rows", a.strategy, rows),
                AttemptStatus::Empty => format!("{}: no data", a.strategy),
                AttemptStatus::Failed { reason } => format!("{}: {}", a.strategy, reason),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
