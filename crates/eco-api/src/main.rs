//! eco-server — HTTP front end for the eco-route engine.
//!
//! ```text
//! eco-server [config.json]
//! ```
//!
//! `ECO_BIND` sets the listen address (default `0.0.0.0:8080`); `RUST_LOG`
//! sets the log filter (default `info`).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use eco_api::{build_router, AppState};
use eco_service::{EngineConfig, OptimizationService};
use eco_zones::JsonConstraintSource;

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_path(Path::new(&path))
            .with_context(|| format!("reading config {path}"))?,
        None => {
            warn!("no config file given; using defaults");
            EngineConfig::default()
        }
    };

    let service = Arc::new(
        OptimizationService::from_config(config.clone()).context("starting optimization service")?,
    );

    if let Some(path) = config.constraints_json.clone() {
        if config.constraints_refresh_s > 0 {
            let source = Arc::new(JsonConstraintSource::new(path));
            tokio::spawn(refresh_constraints(service.clone(), source, config.constraints_refresh_s));
        }
    }

    let app = build_router(AppState::new(service));
    let bind = std::env::var("ECO_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!(%bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shut down");
    Ok(())
}

/// Re-read the constraint file every `secs` seconds.  Failures are logged by
/// the store, which keeps serving the last good snapshot.
async fn refresh_constraints(service: Arc<OptimizationService>, source: Arc<JsonConstraintSource>, secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let (svc, src) = (service.clone(), source.clone());
        match tokio::task::spawn_blocking(move || svc.refresh_constraints(src.as_ref())).await {
            Ok(Ok(version)) => debug!(version, "constraints refreshed"),
            Ok(Err(_)) => {}
            Err(e) => warn!(error = %e, "constraint refresh task failed"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
