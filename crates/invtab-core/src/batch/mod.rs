//! Batch processing: run documents through the strategy chain and merge the rows.

mod orchestrator;
mod progress;
mod reconcile;

pub use orchestrator::{BatchOrchestrator, BatchReport, BatchStatus, DocumentSummary, DocumentWarning};
pub use progress::{NoProgress, ProgressSink};
pub use reconcile::{rows_from_extraction, DocumentRows, ResultTable, Row, FILE_NAME_COLUMN};
