//! Toxiscan Orchestrator
//!
//! The component a UI talks to. One [`ClassificationOrchestrator`] backs one
//! UI surface:
//! - validates the comment locally
//! - allows a single submission in flight, rejecting the rest with `Busy`
//! - times the gateway round trip and bounds it with a timeout
//! - normalizes the payload and records the result in history
//!
//! Exactly one history insertion happens per successful submission and
//! none on failure.

pub mod metrics;
pub mod orchestrator;

pub use metrics::{ClassificationMetrics, MetricsSnapshot};
pub use orchestrator::{ClassificationOrchestrator, OrchestratorConfig, OrchestratorState};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::orchestrator::{ClassificationOrchestrator, OrchestratorConfig};
    pub use toxiscan_classifiers::PredictionGateway;
    pub use toxiscan_core::{ClassificationRecord, Error, ErrorKind, Result};
    pub use toxiscan_history::HistoryStore;
}
