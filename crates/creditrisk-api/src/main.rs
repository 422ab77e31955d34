//! CreditRisk API server
//!
//! Serves credit default predictions over HTTP from a fitted model artifact.

use anyhow::Result;
use clap::Parser;
use creditrisk_api::{create_router, AppState, Cli, LogFormat, ServerConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so the file can pick the log format
    let config = ServerConfig::load(&cli.config, &cli)?;

    init_tracing(cli.verbose, config.log_format);

    info!("Starting CreditRisk API");
    info!("Configuration loaded successfully");
    info!("Model artifact: {}", config.model_path.display());
    if config.debug {
        warn!("Debug mode enabled: internal error details are returned to clients");
    }

    let metrics_handle = init_metrics()?;

    let addr = config.socket_addr()?;
    let preload = config.preload_model;
    let state = AppState::new(config, metrics_handle);

    if preload {
        info!("Preloading model...");
        state.preload_model().await;
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("creditrisk=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("creditrisk=info,tower_http=info"))
    };

    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "creditrisk_requests_total",
        "Total number of prediction requests received"
    );
    metrics::describe_counter!(
        "creditrisk_predictions_total",
        "Prediction outcomes by result (success, validation_error, internal_error)"
    );
    metrics::describe_histogram!(
        "creditrisk_prediction_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end prediction latency in microseconds"
    );
    metrics::describe_counter!(
        "creditrisk_model_loads_total",
        "Model load attempts by result"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
