use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_indexed: AtomicU64,
    chunks_summarized: AtomicU64,
    failed_invocations: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an indexed document and the number of chunks summarized for it.
    pub fn record_document(&self, chunk_count: u64) {
        self.documents_indexed.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
    }

    /// Record an invocation that ended in an error response.
    pub fn record_failure(&self) {
        self.failed_invocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            failed_invocations: self.failed_invocations.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents indexed since startup.
    pub documents_indexed: u64,
    /// Chunks summarized across all indexed documents.
    pub chunks_summarized: u64,
    /// Invocations that returned an error response.
    pub failed_invocations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_chunks() {
        let metrics = PipelineMetrics::new();
        metrics.record_document(2);
        metrics.record_document(3);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_indexed, 2);
        assert_eq!(snapshot.chunks_summarized, 5);
        assert_eq!(snapshot.failed_invocations, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        let snapshot = PipelineMetrics::new().snapshot();
        assert_eq!(snapshot.documents_indexed, 0);
        assert_eq!(snapshot.chunks_summarized, 0);
        assert_eq!(snapshot.failed_invocations, 0);
    }
}
