//! Retrieval outcome counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters recorded by a [`Retriever`](crate::retriever::Retriever)
#[derive(Debug, Default)]
pub struct RetrievalMetrics {
    retrieved: AtomicU64,
    http_errors: AtomicU64,
    transport_errors: AtomicU64,
    rejected_content_types: AtomicU64,
    preverify_skipped: AtomicU64,
}

impl RetrievalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retrieved(&self) {
        self.retrieved.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "retrieved", "Metric incremented");
    }

    pub fn http_error(&self) {
        self.http_errors.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "http_errors", "Metric incremented");
    }

    pub fn transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "transport_errors", "Metric incremented");
    }

    pub fn content_type_rejected(&self) {
        self.rejected_content_types.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "rejected_content_types", "Metric incremented");
    }

    pub fn preverify_skipped(&self) {
        self.preverify_skipped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "preverify_skipped", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            retrieved: self.retrieved.load(Ordering::Relaxed),
            http_errors: self.http_errors.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            rejected_content_types: self.rejected_content_types.load(Ordering::Relaxed),
            preverify_skipped: self.preverify_skipped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub retrieved: u64,
    pub http_errors: u64,
    pub transport_errors: u64,
    pub rejected_content_types: u64,
    pub preverify_skipped: u64,
}
