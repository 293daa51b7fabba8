// src/scheduler.rs
//! Background tasks for a running kiosk:
//! - initial load of both feeds,
//! - the rotation timer,
//! - refresh of a feed whenever its view becomes active,
//! - optional periodic re-poll.
//!
//! Every feed refresh runs in its own task, so a slow or failing feed never
//! holds up the other one or the rotation.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::dashboard::SharedDashboard;
use crate::feeds::FeedId;

/// Spawn all background tasks. Returns their handles (abort to stop).
pub fn spawn_background(
    dashboard: &SharedDashboard,
    poll_interval: Option<Duration>,
) -> Vec<JoinHandle<()>> {
    let mut handles: Vec<JoinHandle<()>> = FeedId::ALL
        .into_iter()
        .map(|feed| spawn_refresh(dashboard, feed))
        .collect();

    handles.push(spawn_rotation_driver(dashboard));
    handles.push(spawn_reentry_refresh(dashboard));

    if let Some(every) = poll_interval {
        for feed in FeedId::ALL {
            handles.push(spawn_periodic_refresh(dashboard, feed, every));
        }
    }

    tracing::info!(
        target: "scheduler",
        period_secs = dashboard.rotation().period().num_seconds(),
        poll_interval_secs = poll_interval.map(|d| d.as_secs()),
        "background tasks started"
    );
    handles
}

/// One detached refresh cycle. Failures are already in the feed state.
pub fn spawn_refresh(dashboard: &SharedDashboard, feed: FeedId) -> JoinHandle<()> {
    let d = SharedDashboard::clone(dashboard);
    tokio::spawn(async move {
        let _ = d.refresh(feed).await;
    })
}

pub fn spawn_rotation_driver(dashboard: &SharedDashboard) -> JoinHandle<()> {
    let d = SharedDashboard::clone(dashboard);
    tokio::spawn(async move { d.rotation().run().await })
}

/// Refresh the feed behind the view that just became active. In-flight
/// fetches of the view we left are not cancelled.
pub fn spawn_reentry_refresh(dashboard: &SharedDashboard) -> JoinHandle<()> {
    let d = SharedDashboard::clone(dashboard);
    let mut rx = d.subscribe_rotation();
    // taken before spawning so a switch racing the task start is not missed
    let mut shown = rx.borrow_and_update().active_view;
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let now_shown = rx.borrow_and_update().active_view;
            if now_shown != shown {
                shown = now_shown;
                spawn_refresh(&d, now_shown.feed());
            }
        }
    })
}

/// Re-poll one feed on a fixed interval. The first tick is skipped because
/// the initial load already covers it.
pub fn spawn_periodic_refresh(
    dashboard: &SharedDashboard,
    feed: FeedId,
    every: Duration,
) -> JoinHandle<()> {
    let d = SharedDashboard::clone(dashboard);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            tracing::debug!(target: "scheduler", %feed, "periodic refresh tick");
            spawn_refresh(&d, feed);
        }
    })
}
