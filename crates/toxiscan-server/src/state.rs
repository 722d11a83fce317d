use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use toxiscan_orchestrator::ClassificationOrchestrator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The single orchestrator backing this UI surface
    pub orchestrator: Arc<ClassificationOrchestrator>,

    /// Prometheus handle for rendering; absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(orchestrator: ClassificationOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            metrics_handle: None,
        }
    }

    /// Attach a Prometheus handle
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}
