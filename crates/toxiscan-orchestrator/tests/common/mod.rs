//! Mock gateways for orchestrator tests
//!
//! Configurable implementations of the PredictionGateway trait for testing
//! single flight, timeouts, and failure propagation, plus a history backend
//! that parks inside `save`.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use toxiscan_classifiers::PredictionGateway;
use toxiscan_core::{ClassificationRecord, Error, ErrorKind, RawPrediction, Result};
use toxiscan_history::HistoryPersistence;

/// A gateway that answers every call with the same payload
pub struct MockGateway {
    payload: Value,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
    last_comment: parking_lot::Mutex<Option<String>>,
}

impl MockGateway {
    /// Create a gateway returning `payload`
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            simulated_latency: None,
            call_count: AtomicU32::new(0),
            last_comment: parking_lot::Mutex::new(None),
        }
    }

    /// Set simulated latency for this gateway
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Get the number of times predict was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Comment received by the most recent call
    pub fn last_comment(&self) -> Option<String> {
        self.last_comment.lock().clone()
    }
}

#[async_trait]
impl PredictionGateway for MockGateway {
    async fn predict(&self, comment: &str) -> Result<RawPrediction> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_comment.lock() = Some(comment.to_string());

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        Ok(RawPrediction::from_value(self.payload.clone()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A gateway that always fails with the given kind
pub struct FailingGateway {
    kind: ErrorKind,
    call_count: AtomicU32,
}

impl FailingGateway {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PredictionGateway for FailingGateway {
    async fn predict(&self, _comment: &str) -> Result<RawPrediction> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Err(match self.kind {
            ErrorKind::UpstreamUnavailable => Error::unavailable("simulated outage"),
            _ => Error::upstream("simulated failure"),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// A gateway that holds every call until released
pub struct GatedGateway {
    payload: Value,
    release: Arc<Notify>,
    entered: Arc<Notify>,
    call_count: AtomicU32,
}

impl GatedGateway {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            release: Arc::new(Notify::new()),
            entered: Arc::new(Notify::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Wait until a call is parked inside the gateway
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the parked call finish
    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PredictionGateway for GatedGateway {
    async fn predict(&self, _comment: &str) -> Result<RawPrediction> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(RawPrediction::from_value(self.payload.clone()))
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// A history backend whose `save` blocks until released
pub struct GatedPersistence {
    entered: Mutex<mpsc::Sender<usize>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl GatedPersistence {
    /// Returns the backend, a receiver told the record count of each save,
    /// and a sender that lets one save finish
    pub fn new() -> (Self, mpsc::Receiver<usize>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let backend = Self {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        (backend, entered_rx, release_tx)
    }
}

impl HistoryPersistence for GatedPersistence {
    fn load(&self) -> Result<Vec<ClassificationRecord>> {
        Ok(Vec::new())
    }

    fn save(&self, records: &[ClassificationRecord]) -> Result<()> {
        let _ = self.entered.lock().send(records.len());
        let _ = self.release.lock().recv();
        Ok(())
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}
