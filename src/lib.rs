// src/lib.rs
// Public library surface for the binary, integration tests and the probe.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod derived;
pub mod error;
pub mod feeds;
pub mod liveness;
pub mod metrics;
pub mod rotation;
pub mod scheduler;
pub mod schema;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::DashboardConfig;
pub use crate::dashboard::{Dashboard, SharedDashboard};
pub use crate::error::FeedError;
pub use crate::feeds::{FeedId, FeedPoller, FeedSnapshot, FeedState};
pub use crate::rotation::{Countdown, Rotation, RotationState, ViewId};

use std::sync::Arc;

/// Load config, build the dashboard and start its background tasks.
/// Returns the shared handle the HTTP layer serves from.
pub fn start_from_env() -> anyhow::Result<SharedDashboard> {
    let cfg = DashboardConfig::load_default()?;
    tracing::info!(
        nbd = %cfg.nbd_url,
        inventory = %cfg.inventory_url,
        rotation_period_secs = cfg.rotation_period_secs,
        liveness_window_secs = cfg.liveness_window_secs,
        "dashboard config loaded"
    );
    let dashboard = Arc::new(Dashboard::from_config(&cfg));
    scheduler::spawn_background(&dashboard, cfg.poll_interval());
    Ok(dashboard)
}
