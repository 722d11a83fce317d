use crate::config::{AppConfig, ServerConfig};
use crate::server::routes;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use toxiscan_classifiers::HttpPredictionGateway;
use toxiscan_history::HistoryStore;
use toxiscan_orchestrator::ClassificationOrchestrator;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Wire the HTTP gateway, history store, and orchestrator from configuration
pub fn build_orchestrator(config: &AppConfig) -> anyhow::Result<ClassificationOrchestrator> {
    let gateway = HttpPredictionGateway::new(&config.gateway)?;
    let history = HistoryStore::from_config(&config.history)?;

    Ok(ClassificationOrchestrator::new(
        Arc::new(gateway),
        history,
        config.orchestrator.clone(),
    ))
}

/// Build the Axum application
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        .route("/classify", post(routes::classify))
        .route(
            "/history",
            get(routes::list_history).delete(routes::clear_history),
        )
        .route("/status", get(routes::status));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server until a shutdown signal arrives
pub async fn run_server(config: AppConfig, state: AppState) -> anyhow::Result<()> {
    let app = build_app(state, &config.server);
    let addr = config.server.addr();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Toxiscan API listening on http://{}", listener.local_addr()?);
    tracing::info!("Prediction service: {}", config.gateway.endpoint);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
