// src/liveness.rs
//! A feed is live when its latest snapshot is recent and the last cycle did
//! not fail. Derived on every read, never stored.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::feeds::FeedState;

/// Default recency window (5 minutes), longer than one full two-view rotation.
pub const DEFAULT_LIVENESS_WINDOW: Duration = Duration::from_secs(300);

pub fn is_live<R>(state: &FeedState<R>, now: DateTime<Utc>, window: TimeDelta) -> bool {
    if state.error.is_some() {
        return false;
    }
    match state.fetched_at() {
        // future-dated snapshots (clock skew) count as fresh
        Some(at) => now - at <= window,
        None => false,
    }
}

/// Convert a configured window, falling back to the default on overflow.
pub fn window_from(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d)
        .unwrap_or_else(|_| TimeDelta::seconds(DEFAULT_LIVENESS_WINDOW.as_secs() as i64))
}
