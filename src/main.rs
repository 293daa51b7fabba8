//! Kiosk dashboard core binary entrypoint.
//! Boots the Axum HTTP server, starts feed polling and the view rotation.

use kiosk_rotation_core::{api, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; JSON lines when KIOSK_LOG_JSON=1.
/// Leaves an already-installed subscriber (e.g. the runtime's) in place.
fn enable_tracing() {
    let json = std::env::var("KIOSK_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kiosk_rotation_core=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_tracing();

    let metrics = Metrics::init()?;
    let dashboard = kiosk_rotation_core::start_from_env()?;

    let router = api::router(dashboard).merge(metrics.router());
    tracing::info!("kiosk core ready");

    Ok(router.into())
}
