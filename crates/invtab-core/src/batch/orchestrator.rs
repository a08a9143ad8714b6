//! Runs the strategy chain over a batch of documents and merges the results.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::progress::ProgressSink;
use super::reconcile::{rows_from_extraction, DocumentRows, ResultTable};
use crate::error::{ExtractionError, Result};
use crate::extract::{Attempt, StrategyChain, StrategyKind};
use crate::models::config::InvtabConfig;
use crate::models::document::{file_name, supplier_guess, Document};

/// Overall outcome of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// At least one document produced rows.
    Completed,
    /// No document produced any rows.
    NoData,
}

impl BatchStatus {
    pub fn message(&self) -> &'static str {
        match self {
            BatchStatus::Completed => "completed",
            BatchStatus::NoData => "no extractable data",
        }
    }
}

/// A document that contributed no rows, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentWarning {
    pub file_name: String,
    pub message: String,
}

/// Per-document processing record.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub file_name: String,
    pub supplier_guess: String,
    /// Strategy whose output was used, if any.
    pub strategy: Option<StrategyKind>,
    pub rows: usize,
    pub attempts: Vec<Attempt>,
}

/// Result of [`BatchOrchestrator::run`].
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub table: ResultTable,
    pub status: BatchStatus,
    pub warnings: Vec<DocumentWarning>,
    pub documents: Vec<DocumentSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// The result table, or [`ExtractionError::NoData`] when nothing was extracted.
    pub fn into_table(self) -> std::result::Result<ResultTable, ExtractionError> {
        match self.status {
            BatchStatus::Completed => Ok(self.table),
            BatchStatus::NoData => Err(ExtractionError::NoData),
        }
    }
}

/// Output of one document, before assembly.
struct DocumentOutput {
    summary: DocumentSummary,
    rows: Option<DocumentRows>,
    warning: Option<DocumentWarning>,
}

/// Drives documents through the strategy chain.
pub struct BatchOrchestrator {
    chain: StrategyChain,
    jobs: usize,
}

impl BatchOrchestrator {
    pub fn new(chain: StrategyChain) -> Self {
        Self { chain, jobs: 1 }
    }

    /// Standard chain and job count from configuration.
    pub fn from_config(config: &InvtabConfig) -> Result<Self> {
        Ok(Self::new(StrategyChain::standard(config)?).with_jobs(config.batch.jobs))
    }

    /// Process up to `jobs` documents at once (values below 1 mean 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Process `paths` in order and reconcile everything that was extracted.
    pub fn run(&self, paths: &[PathBuf], progress: &dyn ProgressSink) -> BatchReport {
        let started_at = Utc::now();
        let total = paths.len();
        info!("Processing {} documents with {} job(s)", total, self.jobs);

        let outputs: Vec<DocumentOutput> = if self.jobs == 1 || total <= 1 {
            paths
                .iter()
                .enumerate()
                .map(|(i, path)| {
                    let output = self.process(path);
                    progress.document_finished(i + 1, total);
                    output
                })
                .collect()
        } else {
            self.run_parallel(paths, progress)
        };

        let mut documents = Vec::with_capacity(total);
        let mut warnings = Vec::new();
        let mut partials = Vec::new();
        for output in outputs {
            documents.push(output.summary);
            warnings.extend(output.warning);
            partials.extend(output.rows);
        }

        let table = ResultTable::from_documents(&partials);
        let status = if table.is_empty() {
            BatchStatus::NoData
        } else {
            BatchStatus::Completed
        };
        info!(
            "Batch {}: {} rows from {} of {} documents",
            status.message(),
            table.len(),
            partials.len(),
            total
        );

        BatchReport {
            table,
            status,
            warnings,
            documents,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Workers pull the next index; results land in per-document slots so
    /// assembly keeps input order.
    fn run_parallel(&self, paths: &[PathBuf], progress: &dyn ProgressSink) -> Vec<DocumentOutput> {
        let total = paths.len();
        let next = AtomicUsize::new(0);
        let processed = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<DocumentOutput>>> =
            Mutex::new((0..total).map(|_| None).collect());

        std::thread::scope(|scope| {
            for _ in 0..self.jobs.min(total) {
                scope.spawn(|| loop {
                    let i = next.fetch_add(1, Ordering::SeqCst);
                    if i >= total {
                        break;
                    }
                    let output = self.process(&paths[i]);
                    slots.lock().unwrap_or_else(|e| e.into_inner())[i] = Some(output);
                    progress.document_finished(processed.fetch_add(1, Ordering::SeqCst) + 1, total);
                });
            }
        });

        slots
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .into_iter()
            .flatten()
            .collect()
    }

    fn process(&self, path: &std::path::Path) -> DocumentOutput {
        let name = file_name(path);
        let guess = supplier_guess(path);
        let mut summary = DocumentSummary {
            file_name: name.clone(),
            supplier_guess: guess.clone(),
            strategy: None,
            rows: 0,
            attempts: Vec::new(),
        };

        let document = match Document::open(path) {
            Ok(document) => document,
            Err(e) => {
                warn!("{}: {}", name, e);
                return DocumentOutput {
                    summary,
                    rows: None,
                    warning: Some(DocumentWarning {
                        file_name: name,
                        message: e.to_string(),
                    }),
                };
            }
        };

        let outcome = self.chain.extract(&document);
        summary.attempts = outcome.attempts.clone();
        summary.strategy = outcome.strategy();

        match &outcome.extraction {
            Some((kind, extraction)) => {
                let rows = rows_from_extraction(extraction, &guess, &name);
                debug!("{}: {} rows via {}", name, rows.len(), kind);
                summary.rows = rows.len();
                DocumentOutput {
                    summary,
                    rows: Some(DocumentRows {
                        file_name: name,
                        rows,
                    }),
                    warning: None,
                }
            }
            None => {
                let message = format!("no data extracted ({})", outcome.failure_summary());
                warn!("{}: {}", name, message);
                DocumentOutput {
                    summary,
                    rows: None,
                    warning: Some(DocumentWarning {
                        file_name: name,
                        message,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::progress::NoProgress;
    use crate::extract::ExtractionStrategy;
    use crate::models::table::{Extraction, LineItem, NormalizedTable};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    /// Decides by file name prefix: `A*` has a ruled table, `B*` only OCR text, others nothing.
    struct ByName(StrategyKind);

    impl ExtractionStrategy for ByName {
        fn kind(&self) -> StrategyKind {
            self.0
        }

        fn extract(&self, document: &Document) -> Result<Option<Extraction>> {
            let first = document.file_name.chars().next();
            Ok(match (self.0, first) {
                (StrategyKind::Structured, Some('A')) => Some(Extraction::Tables(vec![NormalizedTable {
                    page: 1,
                    columns: vec!["item".into(), "qty".into(), "Notes".into()],
                    rows: vec![
                        vec!["Widget".into(), "2".into(), "blue".into()],
                        vec!["Gadget".into(), "1".into(), "".into()],
                    ],
                }])),
                (StrategyKind::Ocr, Some('B')) => Some(Extraction::LineItems(vec![LineItem {
                    item: "Bolt".into(),
                    qty: "100".into(),
                    price: "0.10".into(),
                    total: "10.00".into(),
                }])),
                _ => None,
            })
        }
    }

    fn orchestrator(jobs: usize) -> BatchOrchestrator {
        BatchOrchestrator::new(StrategyChain::new(vec![
            Box::new(ByName(StrategyKind::Structured)),
            Box::new(ByName(StrategyKind::TextLayout)),
            Box::new(ByName(StrategyKind::Ocr)),
        ]))
        .with_jobs(jobs)
    }

    fn write_inputs(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                std::fs::write(&path, b"%PDF-1.4").unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_inputs(dir.path(), &["Acme_inv.pdf", "Beta_scan.pdf", "Corp_blank.pdf"]);

        let seen = Mutex::new(Vec::new());
        let progress = |processed: usize, total: usize| seen.lock().unwrap().push((processed, total));
        let report = orchestrator(1).run(&paths, &progress);

        assert_eq!(report.status, BatchStatus::Completed);
        assert_eq!(report.table.len(), 3);
        assert_eq!(
            report.table.column("file_name").unwrap(),
            vec!["Acme_inv.pdf", "Acme_inv.pdf", "Beta_scan.pdf"]
        );
        assert_eq!(report.table.column("supplier").unwrap(), vec!["Acme", "Acme", "Beta"]);
        assert_eq!(report.table.column("price").unwrap(), vec!["", "", "0.10"]);
        assert_eq!(report.table.column("Notes").unwrap(), vec!["blue", "", ""]);

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].file_name, "Corp_blank.pdf");
        assert_eq!(report.documents[1].strategy, Some(StrategyKind::Ocr));
        assert_eq!(report.documents[1].attempts.len(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_inputs(dir.path(), &["Corp_1.pdf", "Corp_2.pdf"]);

        let report = orchestrator(1).run(&paths, &NoProgress);
        assert_eq!(report.status, BatchStatus::NoData);
        assert_eq!(report.warnings.len(), 2);
        assert!(matches!(report.into_table(), Err(ExtractionError::NoData)));
    }

    #[test]
    fn test_unreadable_file_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_inputs(dir.path(), &["Acme_1.pdf"]);
        paths.insert(0, dir.path().join("Missing_0.pdf"));

        let report = orchestrator(1).run(&paths, &NoProgress);
        assert_eq!(report.status, BatchStatus::Completed);
        assert_eq!(report.table.len(), 2);
        assert_eq!(report.warnings[0].file_name, "Missing_0.pdf");
        assert!(report.warnings[0].message.starts_with("cannot read"));
    }

    #[test]
    fn test_repeatable_and_parallel_output_matches() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..12)
            .map(|i| format!("{}_{}.pdf", ["Acme", "Beta", "Corp"][i % 3], i))
            .collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let paths = write_inputs(dir.path(), &names);

        let first = orchestrator(1).run(&paths, &NoProgress);
        let second = orchestrator(1).run(&paths, &NoProgress);
        let parallel = orchestrator(4).run(&paths, &NoProgress);

        assert_eq!(first.table, second.table);
        assert_eq!(first.table, parallel.table);
        assert_eq!(first.warnings, parallel.warnings);
        assert_eq!(parallel.table.len(), 12);
    }

    #[test]
    fn test_malformed_font_does_not_stop_the_batch() {
        use crate::extract::{StructuredTableStrategy, TextLayoutStrategy};
        use crate::models::config::{ColumnConfig, TableConfig};
        use crate::pdf::{build_pdf, ruled_grid, text_ops};
        use lopdf::content::Operation;
        use lopdf::Object;

        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("Bad_1.pdf");
        let good = dir.path().join("Good_2.pdf");

        // Uses a font the page resources do not define
        let missing_font = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F9".to_vec()), Object::Integer(12)]),
            Operation::new("Td", vec![Object::Integer(72), Object::Integer(700)]),
            Operation::new("Tj", vec![Object::string_literal("Item  Qty")]),
            Operation::new("ET", vec![]),
        ];
        std::fs::write(&bad, build_pdf(vec![missing_font])).unwrap();

        let mut ruled = ruled_grid(&[50, 200, 300], &[700, 680, 660]);
        ruled.extend(text_ops(60, 686, "Item"));
        ruled.extend(text_ops(210, 686, "Qty"));
        ruled.extend(text_ops(60, 666, "Widget"));
        ruled.extend(text_ops(210, 666, "4"));
        std::fs::write(&good, build_pdf(vec![ruled])).unwrap();

        let orchestrator = BatchOrchestrator::new(StrategyChain::new(vec![
            Box::new(StructuredTableStrategy::new(TableConfig::default(), ColumnConfig::default(), 0)),
            Box::new(TextLayoutStrategy::new(ColumnConfig::default(), 0)),
        ]));
        let report = orchestrator.run(&[bad, good], &NoProgress);

        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].file_name, "Bad_1.pdf");
        assert_eq!(report.status, BatchStatus::Completed);
        assert_eq!(report.table.column("item").unwrap(), vec!["Widget"]);
        assert_eq!(report.table.column("file_name").unwrap(), vec!["Good_2.pdf"]);
    }
}
