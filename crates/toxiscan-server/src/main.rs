//! Toxiscan
//!
//! Submit comments to a toxicity prediction service and keep a local
//! history of the verdicts, from the command line or a web UI.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use toxiscan_server::cli::{Cli, Commands};
use toxiscan_server::config::AppConfig;
use toxiscan_server::server::{build_orchestrator, run_server};
use toxiscan_server::{commands, mock, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(&cli.config, &cli.overrides())?;

    match cli.command {
        Commands::Serve { .. } => {
            info!("Starting Toxiscan API");
            info!("History: {}", describe_history(&config));

            let metrics_handle = init_metrics()?;
            let orchestrator = build_orchestrator(&config)?;
            let state = AppState::new(orchestrator).with_metrics(metrics_handle);

            run_server(config, state).await?;
        }

        Commands::Classify { comment, json, .. } => {
            commands::classify(&config, &comment, json).await?;
        }

        Commands::History { limit, json } => {
            commands::history(&config, limit, json)?;
        }

        Commands::ClearHistory => {
            commands::clear_history(&config)?;
        }

        Commands::MockModel {
            listen,
            port,
            shape,
        } => {
            let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
            let listener = tokio::net::TcpListener::bind(addr).await?;

            tokio::select! {
                result = mock::serve_mock_model(listener, shape) => result?,
                _ = toxiscan_server::server::shutdown_signal() => info!("Mock prediction service stopped"),
            }
        }
    }

    Ok(())
}

fn describe_history(config: &AppConfig) -> String {
    if config.history.persist {
        format!(
            "{} (capacity {})",
            config.history.file_path().display(),
            config.history.capacity
        )
    } else {
        format!("in memory (capacity {})", config.history.capacity)
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("toxiscan=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("toxiscan=info,tower_http=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "toxiscan_submissions_total",
        "Comment submissions by outcome"
    );
    metrics::describe_counter!(
        "toxiscan_verdicts_total",
        "Successful classifications by result"
    );
    metrics::describe_histogram!(
        "toxiscan_round_trip_ms",
        metrics::Unit::Milliseconds,
        "Prediction round trip in milliseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
