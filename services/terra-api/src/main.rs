//! TerraSight API Server
//!
//! Web viewer for Earth Engine climate, weather and terrain datasets.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use earth_engine::{EarthEngineClient, ImageryGateway};
use terra_api::build_router;
use terra_api::config::Args;
use terra_api::state::AppState;
use terra_common::Registry;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.debug {
        fmt().with_env_filter(filter).with_target(true).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .json()
            .init();
    }
}

async fn run_server(args: Args) -> anyhow::Result<()> {
    init_tracing(&args);

    info!("Starting TerraSight API server");

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    if !args.credentials.exists() {
        error!(
            path = %args.credentials.display(),
            "Service account key file not found"
        );
    }

    let gateway: Arc<dyn ImageryGateway> =
        Arc::new(EarthEngineClient::new(args.earth_engine_config()));

    // Authentication is retried on the first request if this fails.
    match gateway.ensure_ready().await {
        Ok(()) => info!("Earth Engine initialized"),
        Err(e) => error!(
            error = %e,
            "Earth Engine initialization failed, the application may not work correctly"
        ),
    }

    let registry = Registry::builtin(Utc::now().date_naive());
    info!(datasets = registry.len(), "Dataset registry loaded");

    let state = Arc::new(
        AppState::new(registry, gateway)
            .with_debug(args.debug)
            .with_prometheus(prometheus),
    );

    let app = build_router(state, &args.static_dir);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("TerraSight API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
