//! Classification metrics
//!
//! Counters are kept in-process for the status endpoint and also emitted
//! through the `metrics` facade for Prometheus.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use toxiscan_core::{ErrorKind, ToxicityLabel};

/// Metrics collector for classification outcomes
#[derive(Clone, Default)]
pub struct ClassificationMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    submissions: AtomicU64,
    succeeded: AtomicU64,
    toxic: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
    total_round_trip_ms: AtomicU64,
}

impl ClassificationMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful classification
    pub fn record_success(&self, result: ToxicityLabel, round_trip_ms: u64) {
        self.inner.submissions.fetch_add(1, Ordering::Relaxed);
        self.inner.succeeded.fetch_add(1, Ordering::Relaxed);
        if result.is_toxic() {
            self.inner.toxic.fetch_add(1, Ordering::Relaxed);
        }
        self.inner
            .total_round_trip_ms
            .fetch_add(round_trip_ms, Ordering::Relaxed);

        metrics::counter!("toxiscan_submissions_total", "outcome" => "success").increment(1);
        metrics::counter!("toxiscan_verdicts_total", "result" => result.as_str()).increment(1);
        metrics::histogram!("toxiscan_round_trip_ms").record(round_trip_ms as f64);
    }

    /// Record a failed submission
    pub fn record_failure(&self, kind: ErrorKind) {
        self.inner.submissions.fetch_add(1, Ordering::Relaxed);
        if kind.is_validation() {
            self.inner.rejected.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.failed.fetch_add(1, Ordering::Relaxed);
        }

        metrics::counter!("toxiscan_submissions_total", "outcome" => kind.as_str()).increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions: self.inner.submissions.load(Ordering::Relaxed),
            succeeded: self.inner.succeeded.load(Ordering::Relaxed),
            toxic: self.inner.toxic.load(Ordering::Relaxed),
            rejected: self.inner.rejected.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            total_round_trip_ms: self.inner.total_round_trip_ms.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Every call to submit
    pub submissions: u64,
    pub succeeded: u64,
    /// Successful classifications that came back toxic
    pub toxic: u64,
    /// Rejected locally: empty, too long, or busy
    pub rejected: u64,
    /// Failed upstream or in normalization
    pub failed: u64,
    pub total_round_trip_ms: u64,
}

impl MetricsSnapshot {
    /// Average round trip of successful classifications
    pub fn avg_round_trip_ms(&self) -> f64 {
        if self.succeeded == 0 {
            0.0
        } else {
            self.total_round_trip_ms as f64 / self.succeeded as f64
        }
    }
}
