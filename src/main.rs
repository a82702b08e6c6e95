use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use hepato_risk::api::{AppState, prediction_routes};
use hepato_risk::assets;
use hepato_risk::config::ServiceConfig;
use hepato_risk::inference::{PredictorOptions, RiskPredictor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // Keep the guard alive so buffered log lines are flushed on exit.
    let _log_guard = init_tracing(&config);

    eprintln!("🩺 Hepato Risk v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model_path.display());
    eprintln!("   Preprocessor: {}", config.preprocessor_path.display());
    eprintln!("   Preprocessing: {}", config.preprocessing.as_str());
    eprintln!("   Unknown categories: {:?}", config.unknown_category);

    // ── Assets ──────────────────────────────────────────────────────────
    let assets = assets::load(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load inference assets");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // ── HTTP ────────────────────────────────────────────────────────────
    let predictor = Arc::new(RiskPredictor::new(assets, PredictorOptions::from(&config)));
    let app = prediction_routes(AppState {
        predictor,
        response_keys: config.response_keys,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    eprintln!("   Predict: http://{}/predict\n", config.bind_addr);
    tracing::info!(addr = %config.bind_addr, "Prediction server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Prediction server stopped");
    Ok(())
}

fn init_tracing(config: &ServiceConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(false);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hepato-risk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stdout).init();
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
