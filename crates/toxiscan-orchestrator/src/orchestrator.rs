//! Classification orchestrator
//!
//! State machine driven by the UI: `Idle -> Submitting -> Idle`. At most one
//! submission is in flight per orchestrator; a second one is rejected with
//! `Busy` rather than queued.

use crate::metrics::{ClassificationMetrics, MetricsSnapshot};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use toxiscan_classifiers::{normalize, PredictionGateway};
use toxiscan_core::{validate_comment, Classification, ClassificationRecord, Error, Result};
use toxiscan_history::{HistorySnapshot, HistoryStore};
use tracing::{debug, info, warn};

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Upper bound on one gateway call, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl OrchestratorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Set the gateway timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorState {
    Idle,
    Submitting,
}

/// Submits comments, enforces single flight, and records results
pub struct ClassificationOrchestrator {
    gateway: Arc<dyn PredictionGateway>,
    history: RwLock<HistoryStore>,
    in_flight: AtomicBool,
    config: OrchestratorConfig,
    metrics: ClassificationMetrics,
}

impl ClassificationOrchestrator {
    /// Create an orchestrator that owns `history`
    pub fn new(
        gateway: Arc<dyn PredictionGateway>,
        history: HistoryStore,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            history: RwLock::new(history),
            in_flight: AtomicBool::new(false),
            config,
            metrics: ClassificationMetrics::new(),
        }
    }

    /// Classify a comment and add the result to history.
    ///
    /// Validation runs before anything else and never changes state. Gateway
    /// and normalization failures are returned unchanged and leave history
    /// untouched.
    pub async fn submit(&self, comment: &str) -> Result<ClassificationRecord> {
        let outcome = self.run_submission(comment).await;

        match &outcome {
            Ok(record) => {
                self.metrics
                    .record_success(record.result(), record.classification.processing_time_ms);
            }
            Err(e) => {
                let kind = e.kind();
                if kind.is_validation() {
                    debug!("Submission rejected: {}", e);
                } else {
                    warn!(kind = %kind, "Classification failed: {}", e);
                }
                self.metrics.record_failure(kind);
            }
        }

        outcome
    }

    async fn run_submission(&self, comment: &str) -> Result<ClassificationRecord> {
        let comment = validate_comment(comment)?;
        let _flight = self.begin_flight()?;
        let start = Instant::now();

        debug!(
            gateway = self.gateway.name(),
            chars = comment.chars().count(),
            "Submitting comment"
        );

        let timeout = self.config.request_timeout();
        let raw = match tokio::time::timeout(timeout, self.gateway.predict(comment)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::unavailable(format!(
                    "no response within {} ms",
                    timeout.as_millis()
                )))
            }
        };

        let prediction = normalize(&raw)?;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        let classification = Classification {
            comment: comment.to_string(),
            result: prediction.result,
            confidence: prediction.confidence,
            processing_time_ms,
            created_at: Utc::now(),
        };

        let (record, snapshot) = self.history.write().stage_insert(classification);
        save_snapshot(snapshot).await;

        info!(
            id = %record.id,
            result = %record.result(),
            confidence = record.confidence(),
            processing_time_ms,
            "Comment classified"
        );

        Ok(record)
    }

    fn begin_flight(&self) -> Result<FlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| FlightGuard {
                flag: &self.in_flight,
            })
            .map_err(|_| Error::Busy)
    }

    /// Check if a submission is in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Get current state
    pub fn state(&self) -> OrchestratorState {
        if self.is_busy() {
            OrchestratorState::Submitting
        } else {
            OrchestratorState::Idle
        }
    }

    /// Classification history, newest first
    pub fn history(&self) -> Vec<ClassificationRecord> {
        self.history.read().list()
    }

    /// Most recent classifications, newest first
    pub fn recent(&self, limit: usize) -> Vec<ClassificationRecord> {
        self.history.read().iter().take(limit).cloned().collect()
    }

    /// Most recent classification
    pub fn latest(&self) -> Option<ClassificationRecord> {
        self.history.read().latest().cloned()
    }

    /// Number of records in history
    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    /// Empty the local history
    pub async fn clear_history(&self) {
        let snapshot = {
            let mut history = self.history.write();
            let removed = history.len();
            info!("Cleared {} history records", removed);
            history.stage_clear()
        };
        save_snapshot(snapshot).await;
    }

    /// Get current metrics snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}

/// Write history to its backend on the blocking pool, with the history lock
/// already released.
async fn save_snapshot(snapshot: HistorySnapshot) {
    if let Err(e) = tokio::task::spawn_blocking(move || snapshot.save_or_warn()).await {
        warn!("History save task failed: {}", e);
    }
}

/// Returns the orchestrator to `Idle` on every exit path, including when
/// the submit future is dropped mid-flight.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
