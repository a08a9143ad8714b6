//! Progress reporting hooks for batch runs.

/// Receives a notification after every processed document.
pub trait ProgressSink: Send + Sync {
    fn document_finished(&self, processed: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn document_finished(&self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Ignores progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn document_finished(&self, _processed: usize, _total: usize) {}
}
