//! Ordered strategy chain with short-circuit on first success.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use super::{
    Attempt, AttemptStatus, ChainOutcome, ExtractionStrategy, OcrStrategy, StrategyKind,
    StructuredTableStrategy, TextLayoutStrategy,
};
use crate::error::{ExtractionError, InvtabError, Result};
use crate::models::config::InvtabConfig;
use crate::models::document::Document;
use crate::ocr::create_engine;
use crate::pdf::create_renderer;

/// Runs strategies in order until one produces data.
pub struct StrategyChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Structured tables, then text-layout tables, then OCR.
    pub fn standard(config: &InvtabConfig) -> Result<Self> {
        let engine = create_engine(&config.ocr)?;
        Ok(Self::new(vec![
            Box::new(StructuredTableStrategy::new(
                config.tables.clone(),
                config.columns.clone(),
                config.pdf.max_pages,
            )),
            Box::new(TextLayoutStrategy::new(
                config.columns.clone(),
                config.pdf.max_pages,
            )),
            Box::new(OcrStrategy::new(
                create_renderer(&config.pdf),
                engine,
                config.pdf.max_pages,
            )),
        ]))
    }

    /// Strategy kinds in execution order.
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Run the chain on one document.
    pub fn extract(&self, document: &Document) -> ChainOutcome {
        let mut outcome = ChainOutcome::default();

        for strategy in &self.strategies {
            let kind = strategy.kind();
            debug!("{}: trying {} strategy", document.file_name, kind);

            // Third-party PDF code may panic on malformed input
            let result = panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(document)))
                .unwrap_or_else(|payload| {
                    Err(InvtabError::Extraction(ExtractionError::Panicked(
                        panic_message(payload.as_ref()),
                    )))
                });

            let status = match result {
                Ok(Some(extraction)) if !extraction.is_empty() => {
                    let rows = extraction.row_count();
                    info!("{}: {} strategy extracted {} rows", document.file_name, kind, rows);
                    outcome.attempts.push(Attempt {
                        strategy: kind,
                        status: AttemptStatus::Succeeded { rows },
                    });
                    outcome.extraction = Some((kind, extraction));
                    return outcome;
                }
                Ok(_) => {
                    debug!("{}: {} strategy found no data", document.file_name, kind);
                    AttemptStatus::Empty
                }
                Err(e) => {
                    warn!("{}: {} strategy failed: {}", document.file_name, kind, e);
                    AttemptStatus::Failed { reason: e.to_string() }
                }
            };
            outcome.attempts.push(Attempt { strategy: kind, status });
        }

        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
